//! Memoized view of the packages pinned in existing output files.
//!
//! Output files left by a previous run are the only record of what is
//! currently pinned. Each environment's file is parsed at most once per run,
//! on first query, and the result is kept until [`PackageCache::reset`].

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use pinmulti_common::constants::PIN_DELIMITER;
use pinmulti_common::types::OutputLayout;

/// Lifecycle of one environment's cache entry.
#[derive(Debug, Default)]
enum CacheEntry {
    /// The output file has not been read during this run.
    #[default]
    Unpopulated,
    /// Lower-cased names pinned in the output file at first access.
    Populated(BTreeSet<String>),
}

/// Per-environment set of pinned package names.
#[derive(Debug)]
pub struct PackageCache {
    layout: OutputLayout,
    entries: Mutex<HashMap<String, Arc<Mutex<CacheEntry>>>>,
}

impl PackageCache {
    /// Creates an empty cache reading output files located by `layout`.
    #[must_use]
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lower-cased names pinned in `env_name`'s output file.
    ///
    /// A missing or unreadable file yields an empty set.
    pub fn packages_pinned_in(&self, env_name: &str) -> BTreeSet<String> {
        self.with_pins(env_name, Clone::clone)
    }

    /// Whether `package_name` is pinned in `env_name`, ignoring case.
    pub fn has_package(&self, env_name: &str, package_name: &str) -> bool {
        let wanted = package_name.to_lowercase();
        self.with_pins(env_name, |pins| pins.contains(&wanted))
    }

    /// Returns every entry to the unpopulated state.
    pub fn reset(&self) {
        self.entries.lock().clear();
    }

    /// Runs `f` against the populated pin set, reading the file if needed.
    ///
    /// The entry lock is held while the file is parsed so concurrent first
    /// queries for one environment read it only once.
    fn with_pins<R>(&self, env_name: &str, f: impl FnOnce(&BTreeSet<String>) -> R) -> R {
        let entry = Arc::clone(self.entries.lock().entry(env_name.to_owned()).or_default());
        let mut state = entry.lock();
        if let CacheEntry::Unpopulated = *state {
            let path = self.layout.compose_output_file_path(env_name);
            *state = CacheEntry::Populated(read_packages(&path));
        }
        match &*state {
            CacheEntry::Populated(pins) => f(pins),
            CacheEntry::Unpopulated => f(&BTreeSet::new()),
        }
    }
}

/// Parses package names from pin lines (`name==version ...`).
///
/// Lines without the pin delimiter are skipped.
#[must_use]
pub fn parse_pinned_names(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .filter_map(|line| line.split_once(PIN_DELIMITER))
        .map(|(name, _)| name.trim().to_lowercase())
        .collect()
}

/// Invalid UTF-8 is replaced rather than discarding the whole file.
fn read_packages(path: &Path) -> BTreeSet<String> {
    match std::fs::read(path) {
        Ok(bytes) => {
            let pins = parse_pinned_names(&String::from_utf8_lossy(&bytes));
            tracing::debug!(path = %path.display(), count = pins.len(), "cached pinned packages");
            pins
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no readable output, treating as empty");
            BTreeSet::new()
        }
    }
}
