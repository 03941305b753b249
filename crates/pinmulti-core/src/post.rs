//! Rejection of post-release versions.

use std::collections::BTreeSet;

use pinmulti_common::config::{OptionValue, Options};
use pinmulti_common::constants::PIN_DELIMITER;

use crate::feature::{Arity, Feature, OptionDescriptor};

/// Environments that must not pin post-release versions (`1.2.3.post777`).
///
/// Contributes no resolver arguments; compiled output is checked afterwards.
#[derive(Debug)]
pub struct ForbidPost {
    env_names: BTreeSet<String>,
}

impl ForbidPost {
    /// Option description for `--forbid-post`.
    pub const OPTION: OptionDescriptor = OptionDescriptor {
        name: "forbid_post",
        long: "forbid-post",
        short: None,
        arity: Arity::Multiple,
        help: "Environment name (base, test, etc) that cannot have packages \
               with post-release versions (1.2.3.post777). \
               Can be supplied multiple times.",
    };

    /// Resolves the environment list from `options`.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            env_names: options
                .multiple(Self::OPTION.name)
                .unwrap_or_default()
                .iter()
                .cloned()
                .collect(),
        }
    }

    /// Environment names the option was given for.
    #[must_use]
    pub const fn value(&self) -> &BTreeSet<String> {
        &self.env_names
    }

    /// Whether `env_name` forbids post-releases.
    #[must_use]
    pub fn post_forbidden(&self, env_name: &str) -> bool {
        self.env_names.contains(env_name)
    }

    /// Post-release pins (`name==version`) in `content`, if forbidden for
    /// `env_name`. Empty when the environment allows them.
    #[must_use]
    pub fn find_post_releases(&self, env_name: &str, content: &str) -> Vec<String> {
        if !self.post_forbidden(env_name) {
            return Vec::new();
        }
        content
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .filter_map(|line| {
                let (name, rest) = line.split_once(PIN_DELIMITER)?;
                let version = rest
                    .split(|c: char| c.is_whitespace() || c == ';' || c == '\\')
                    .next()
                    .unwrap_or_default();
                is_post_release(version)
                    .then(|| format!("{}{PIN_DELIMITER}{version}", name.trim()))
            })
            .collect()
    }
}

impl Feature for ForbidPost {
    fn descriptor(&self) -> &'static OptionDescriptor {
        &Self::OPTION
    }

    fn option_value(&self) -> OptionValue {
        OptionValue::Multiple(self.env_names.iter().cloned().collect())
    }

    fn pin_options(&self, _env_name: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Whether a version string carries a post-release segment.
#[must_use]
pub fn is_post_release(version: &str) -> bool {
    version
        .to_ascii_lowercase()
        .split(['.', '-', '_'])
        .any(|segment| segment.starts_with("post"))
}
