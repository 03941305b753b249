//! Hash pinning for selected environments.

use std::collections::BTreeSet;

use pinmulti_common::config::{OptionValue, Options};

use crate::feature::{Arity, Feature, OptionDescriptor};

/// Ask the resolver to record package hashes in the listed environments.
#[derive(Debug)]
pub struct GenerateHashes {
    env_names: BTreeSet<String>,
}

impl GenerateHashes {
    /// Option description for `-g/--generate-hashes`.
    pub const OPTION: OptionDescriptor = OptionDescriptor {
        name: "generate_hashes",
        long: "generate-hashes",
        short: Some('g'),
        arity: Arity::Multiple,
        help: "Environment name (base, test, etc) that needs packages hashes. \
               Can be supplied multiple times.",
    };

    /// Argument passed to the resolver for hashed environments.
    pub const ARGUMENT: &'static str = "--generate-hashes";

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

    /// Whether hashes are generated for `env_name`.
    #[must_use]
    pub fn needs_hashes(&self, env_name: &str) -> bool {
        self.env_names.contains(env_name)
    }
}

impl Feature for GenerateHashes {
    fn descriptor(&self) -> &'static OptionDescriptor {
        &Self::OPTION
    }

    fn option_value(&self) -> OptionValue {
        OptionValue::Multiple(self.env_names.iter().cloned().collect())
    }

    fn pin_options(&self, env_name: &str) -> Vec<String> {
        if self.needs_hashes(env_name) {
            vec![Self::ARGUMENT.to_owned()]
        } else {
            Vec::new()
        }
    }
}
