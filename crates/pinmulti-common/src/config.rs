//! Per-run configuration model.
//!
//! [`Options`] is the feature-facing snapshot keyed by option name;
//! [`RunConfig`] holds everything else the run needs (paths, resolver,
//! scheduling). Both are built once and never mutated afterwards.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIRECTORY, DEFAULT_IN_EXT, DEFAULT_OUT_EXT, DEFAULT_RESOLVER};
use crate::types::OutputLayout;

/// A configured option value of one of the supported arities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionValue {
    /// Boolean flag (`--upgrade/--no-upgrade`).
    Flag(bool),
    /// Single value.
    Single(String),
    /// Repeatable value, in the order supplied.
    Multiple(Vec<String>),
}

/// Immutable option snapshot handed to every feature at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    values: BTreeMap<String, OptionValue>,
}

impl Options {
    /// Creates an empty snapshot; every feature resolves to its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        let _ = self.values.insert(key.into(), value);
        self
    }

    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Returns `key` as a flag, if it was supplied as one.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            OptionValue::Flag(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns `key` as a single value, if it was supplied as one.
    #[must_use]
    pub fn single(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            OptionValue::Single(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns `key` as a list. A single value is a list of one.
    #[must_use]
    pub fn multiple(&self, key: &str) -> Option<&[String]> {
        match self.get(key)? {
            OptionValue::Multiple(values) => Some(values.as_slice()),
            OptionValue::Single(value) => Some(std::slice::from_ref(value)),
            OptionValue::Flag(_) => None,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, OptionValue)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, OptionValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Root configuration for a compilation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory containing requirement files.
    pub directory: PathBuf,
    /// Input file extension, without the leading dot.
    pub in_ext: String,
    /// Output file extension, without the leading dot.
    pub out_ext: String,
    /// File with custom header text for generated files.
    pub header: Option<PathBuf>,
    /// Compile only these environments and their references.
    pub only_names: Vec<String>,
    /// External resolver program.
    pub resolver: String,
    /// Stop scheduling new environments after the first failure.
    pub fail_fast: bool,
    /// Upper bound on concurrently compiled environments.
    pub jobs: Option<usize>,
}

impl RunConfig {
    /// Returns the output layout derived from this configuration.
    #[must_use]
    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(self.directory.clone(), &self.out_ext)
    }

    /// Returns the input extension without a leading dot.
    #[must_use]
    pub fn in_ext(&self) -> &str {
        self.in_ext.trim_start_matches('.')
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            in_ext: DEFAULT_IN_EXT.to_owned(),
            out_ext: DEFAULT_OUT_EXT.to_owned(),
            header: None,
            only_names: Vec::new(),
            resolver: DEFAULT_RESOLVER.to_owned(),
            fail_fast: false,
            jobs: None,
        }
    }
}
