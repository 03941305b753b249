//! The contract shared by every resolver-argument policy.

use std::fmt;

use pinmulti_common::config::OptionValue;

/// How an option's value is supplied on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Boolean `--name/--no-name` switch with its default.
    Flag {
        /// Value used when the switch is not given.
        default: bool,
    },
    /// A single value.
    Single,
    /// A value that may be supplied multiple times.
    Multiple,
}

/// Command-line description of a feature's option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// Configuration key the resolved value is read from.
    pub name: &'static str,
    /// Long flag, without leading dashes.
    pub long: &'static str,
    /// Optional short flag.
    pub short: Option<char>,
    /// Value arity.
    pub arity: Arity,
    /// One-line help text.
    pub help: &'static str,
}

/// A self-contained policy contributing extra resolver arguments.
///
/// Implementors resolve their value from the option snapshot once, at
/// construction. An absent value always resolves to an inert default, so a
/// feature never fails the run because its option was not supplied.
pub trait Feature: fmt::Debug + Send + Sync {
    /// Describes where the feature's value comes from.
    fn descriptor(&self) -> &'static OptionDescriptor;

    /// The value resolved at construction, in option-snapshot form.
    fn option_value(&self) -> OptionValue;

    /// Extra resolver arguments for `env_name`, in the order they apply.
    ///
    /// Must not mutate sibling features.
    fn pin_options(&self, env_name: &str) -> Vec<String>;
}
