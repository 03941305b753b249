//! Property-based tests for pin parsing and argument composition.
//!
//! These tests check contracts that must hold for any input:
//! - Every pin line yields its lower-cased name, whatever surrounds it
//! - Composed resolver arguments depend only on the option snapshot

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::path::Path;

use pinmulti_common::config::{OptionValue, Options};
use pinmulti_common::types::{Environment, OutputLayout};
use pinmulti_core::Controller;
use pinmulti_core::package_cache::parse_pinned_names;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Lines a resolver writes around pins; none of them contains `==`.
fn noise_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "# [a-z ]{0,20}",
        "    # via -r [a-z]{1,8}\\.in",
        "-r [a-z]{1,8}\\.txt",
        "    --hash=sha256:[0-9a-f]{16}",
    ]
}

/// A shuffled lock file body and the set of names it pins.
fn lock_document() -> impl Strategy<Value = (BTreeSet<String>, Vec<String>)> {
    (
        prop::collection::btree_map("[a-z][a-z0-9_-]{0,10}", any::<bool>(), 0..12),
        prop::collection::vec(noise_line(), 0..12),
    )
        .prop_flat_map(|(names, noise)| {
            let lines: Vec<String> = names
                .iter()
                .enumerate()
                .map(|(i, (name, &upper))| {
                    let shown = if upper { name.to_uppercase() } else { name.clone() };
                    format!("{shown}==1.{i}")
                })
                .chain(noise)
                .collect();
            let expected: BTreeSet<String> = names.into_keys().collect();
            (Just(expected), Just(lines).prop_shuffle())
        })
}

fn package_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("foo".to_owned()),
            Just("BAR".to_owned()),
            "[a-z][a-z0-9-]{0,8}",
        ],
        0..6,
    )
}

fn controller(dir: &Path, options: &Options) -> Controller {
    let layout = OutputLayout::new(dir, "txt");
    let envs = ["e1", "e2"]
        .iter()
        .map(|name| Environment::new(*name, dir.join(format!("{name}.in")), &layout, Vec::new()))
        .collect();
    Controller::new(options, layout, envs)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Contract: N pin lines among M other lines give exactly the N
    /// lower-cased names, in any interleaving.
    #[test]
    fn pinned_names_ignore_interleaving((expected, lines) in lock_document()) {
        let content = lines.join("\n");
        prop_assert_eq!(parse_pinned_names(&content), expected);
    }

    /// Contract: repeated composition yields identical arguments, on the
    /// same controller and on a fresh one built from the same options.
    #[test]
    fn argument_composition_is_deterministic(packages in package_list()) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("e1.txt"), "foo==1.0\nbar==2.0\n").unwrap();
        let options = Options::new()
            .with("upgrade_packages", OptionValue::Multiple(packages.clone()));

        let first = controller(dir.path(), &options);
        let args = first.build_arguments("e1");
        prop_assert_eq!(&args, &first.build_arguments("e1"));
        prop_assert_eq!(&args, &controller(dir.path(), &options).build_arguments("e1"));

        prop_assert_eq!(&args[..2], &["--rebuild".to_owned(), "--no-header".to_owned()][..]);
        let pinned = packages
            .iter()
            .filter(|p| matches!(p.to_lowercase().as_str(), "foo" | "bar"))
            .count();
        let selective = args.iter().filter(|a| a.starts_with("--upgrade-package=")).count();
        prop_assert_eq!(selective, pinned);
        prop_assert_eq!(args.contains(&"--upgrade".to_owned()), packages.is_empty());
    }
}
