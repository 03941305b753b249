//! Compatible-release relaxation of selected pins.
//!
//! Packages matching one of the configured globs are written as
//! `name~=version` instead of `name==version` in compiled output.

use std::borrow::Cow;

use glob::{MatchOptions, Pattern};
use pinmulti_common::config::{OptionValue, Options};
use pinmulti_common::constants::{COMPATIBLE_DELIMITER, PIN_DELIMITER};

use crate::feature::{Arity, Feature, OptionDescriptor};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Glob patterns of packages pinned with a compatible-release constraint.
#[derive(Debug)]
pub struct Compatible {
    patterns: Vec<Pattern>,
}

impl Compatible {
    /// Option description for `-c/--compatible`.
    pub const OPTION: OptionDescriptor = OptionDescriptor {
        name: "compatible",
        long: "compatible",
        short: Some('c'),
        arity: Arity::Multiple,
        help: "Glob expression for packages with compatible (~=) version constraint. \
               Can be supplied multiple times.",
    };

    /// Resolves the pattern list from `options`. Invalid globs are skipped.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        let patterns = options
            .multiple(Self::OPTION.name)
            .unwrap_or_default()
            .iter()
            .filter_map(|raw| match Pattern::new(raw) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!(pattern = %raw, error = %e, "ignoring invalid --compatible glob");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// Valid patterns, in the order given.
    #[must_use]
    pub fn value(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Whether `package_name` matches any pattern, ignoring case.
    #[must_use]
    pub fn is_compatible(&self, package_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(package_name, MATCH_OPTIONS))
    }

    /// Rewrites a pin line for a matching package to use `~=`.
    ///
    /// Other lines are returned unchanged.
    #[must_use]
    pub fn rewrite_pin<'a>(&self, line: &'a str) -> Cow<'a, str> {
        match line.split_once(PIN_DELIMITER) {
            Some((name, rest))
                if !name.trim_start().starts_with('#') && self.is_compatible(name.trim()) =>
            {
                Cow::Owned(format!("{name}{COMPATIBLE_DELIMITER}{rest}"))
            }
            _ => Cow::Borrowed(line),
        }
    }
}

impl Feature for Compatible {
    fn descriptor(&self) -> &'static OptionDescriptor {
        &Self::OPTION
    }

    fn option_value(&self) -> OptionValue {
        OptionValue::Multiple(self.patterns.iter().map(|p| p.as_str().to_owned()).collect())
    }

    fn pin_options(&self, _env_name: &str) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compatible(patterns: &[&str]) -> Compatible {
        let options = Options::new().with(
            Compatible::OPTION.name,
            OptionValue::Multiple(patterns.iter().map(|p| (*p).to_owned()).collect()),
        );
        Compatible::new(&options)
    }

    #[test]
    fn matching_pins_are_relaxed() {
        let feature = compatible(&["django*"]);
        assert_eq!(feature.rewrite_pin("Django==4.2.1"), "Django~=4.2.1");
        assert_eq!(
            feature.rewrite_pin("django-extensions==3.2.3 \\"),
            "django-extensions~=3.2.3 \\"
        );
    }

    #[test]
    fn other_lines_are_untouched() {
        let feature = compatible(&["django*"]);
        assert!(matches!(feature.rewrite_pin("flask==2.3.2"), Cow::Borrowed(_)));
        assert_eq!(feature.rewrite_pin("    # via django"), "    # via django");
        assert_eq!(feature.rewrite_pin("# django==1.0"), "# django==1.0");
    }

    #[test]
    fn invalid_globs_are_skipped() {
        let feature = compatible(&["[", "flask"]);
        assert!(feature.is_compatible("Flask"));
        assert!(!feature.is_compatible("["));
        assert_eq!(feature.value().len(), 1);
        assert_eq!(feature.option_value(), OptionValue::Multiple(vec!["flask".into()]));
    }

    #[test]
    fn no_patterns_match_nothing() {
        let feature = Compatible::new(&Options::new());
        assert!(!feature.is_compatible("anything"));
        assert!(feature.pin_options("base").is_empty());
    }
}
