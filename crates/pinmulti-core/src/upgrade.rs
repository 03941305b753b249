//! Full and selective upgrade policies.
//!
//! `--upgrade/--no-upgrade` toggles upgrading every package. Naming packages
//! with `--upgrade-package` upgrades only those, only in environments that
//! already pin them, and takes precedence over `--upgrade`. Environments
//! pinning none of the named packages are not recompiled at all.

use std::sync::Arc;

use pinmulti_common::config::{OptionValue, Options};
use pinmulti_common::types::OutputLayout;

use crate::feature::{Arity, Feature, OptionDescriptor};
use crate::package_cache::PackageCache;

/// Capability exposed by the selective upgrade to policies that yield to it.
pub trait UpgradePolicy: std::fmt::Debug + Send + Sync {
    /// Whether a selective upgrade was requested.
    fn active(&self) -> bool;

    /// Whether `env_name` must be recompiled under this policy.
    fn affected(&self, env_name: &str) -> bool;
}

/// Upgrade all packages in all environments.
#[derive(Debug)]
pub struct UpgradeAll {
    value: bool,
    selective: Arc<dyn UpgradePolicy>,
}

impl UpgradeAll {
    /// Option description for `--upgrade/--no-upgrade`.
    pub const OPTION: OptionDescriptor = OptionDescriptor {
        name: "upgrade",
        long: "upgrade",
        short: None,
        arity: Arity::Flag { default: true },
        help: "Upgrade package version (default true)",
    };

    /// Argument passed to the resolver when enabled.
    pub const ARGUMENT: &'static str = "--upgrade";

    /// Resolves the flag from `options`, deferring to `selective` when active.
    #[must_use]
    pub fn new(options: &Options, selective: Arc<dyn UpgradePolicy>) -> Self {
        let explicit = options.flag(Self::OPTION.name);
        if explicit == Some(true) && selective.active() {
            tracing::warn!("--upgrade is ignored because --upgrade-package was given");
        }
        Self {
            value: explicit.unwrap_or(true),
            selective,
        }
    }

    /// The resolved flag value.
    #[must_use]
    pub const fn value(&self) -> bool {
        self.value
    }

    /// Whether a full upgrade applies: the flag is on and no selective
    /// upgrade is active.
    pub fn enabled(&self) -> bool {
        self.value && !self.selective.active()
    }
}

impl Feature for UpgradeAll {
    fn descriptor(&self) -> &'static OptionDescriptor {
        &Self::OPTION
    }

    fn option_value(&self) -> OptionValue {
        OptionValue::Flag(self.value)
    }

    fn pin_options(&self, _env_name: &str) -> Vec<String> {
        if self.enabled() {
            vec![Self::ARGUMENT.to_owned()]
        } else {
            Vec::new()
        }
    }
}

/// Upgrade only the named packages, in environments that already pin them.
#[derive(Debug)]
pub struct UpgradeSelected {
    package_names: Vec<String>,
    cache: PackageCache,
}

impl UpgradeSelected {
    /// Option description for `-P/--upgrade-package`.
    pub const OPTION: OptionDescriptor = OptionDescriptor {
        name: "upgrade_packages",
        long: "upgrade-package",
        short: Some('P'),
        arity: Arity::Multiple,
        help: "Only upgrade named package. Can be supplied multiple times.",
    };

    /// Prefix of the per-package resolver argument.
    pub const ARGUMENT_PREFIX: &'static str = "--upgrade-package=";

    /// Resolves the package list from `options`; pins are read via `layout`.
    #[must_use]
    pub fn new(options: &Options, layout: OutputLayout) -> Self {
        Self {
            package_names: options
                .multiple(Self::OPTION.name)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            cache: PackageCache::new(layout),
        }
    }

    /// Packages requested for upgrade, in the order given.
    #[must_use]
    pub fn value(&self) -> &[String] {
        &self.package_names
    }

    /// Whether `package_name` is pinned in `env_name`'s existing output.
    pub fn has_package(&self, env_name: &str, package_name: &str) -> bool {
        self.cache.has_package(env_name, package_name)
    }

    /// Forgets pins read so far, so the next query re-reads output files.
    pub fn reset(&self) {
        self.cache.reset();
    }

    /// Requested packages pinned in none of `env_names`.
    pub fn unpinned_packages<'a, I>(&self, env_names: I) -> Vec<&str>
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: Clone,
    {
        let envs = env_names.into_iter();
        self.package_names
            .iter()
            .filter(|package| !envs.clone().any(|env| self.has_package(env, package)))
            .map(String::as_str)
            .collect()
    }
}

impl UpgradePolicy for UpgradeSelected {
    fn active(&self) -> bool {
        !self.package_names.is_empty()
    }

    fn affected(&self, env_name: &str) -> bool {
        if !self.active() {
            return true;
        }
        self.package_names
            .iter()
            .any(|package| self.has_package(env_name, package))
    }
}

impl Feature for UpgradeSelected {
    fn descriptor(&self) -> &'static OptionDescriptor {
        &Self::OPTION
    }

    fn option_value(&self) -> OptionValue {
        OptionValue::Multiple(self.package_names.clone())
    }

    fn pin_options(&self, env_name: &str) -> Vec<String> {
        self.package_names
            .iter()
            .filter(|package| self.has_package(env_name, package))
            .map(|package| format!("{}{package}", Self::ARGUMENT_PREFIX))
            .collect()
    }
}
