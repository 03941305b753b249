//! Integration tests for argument composition and recompilation decisions.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use pinmulti_common::config::{OptionValue, Options};
use pinmulti_common::types::{Environment, OutputLayout};
use pinmulti_core::Controller;
use pinmulti_core::upgrade::UpgradePolicy;

fn environments(layout: &OutputLayout, names: &[&str]) -> Vec<Environment> {
    names
        .iter()
        .map(|name| {
            Environment::new(
                *name,
                layout.directory.join(format!("{name}.in")),
                layout,
                Vec::new(),
            )
        })
        .collect()
}

fn controller(dir: &Path, options: &Options) -> Controller {
    let layout = OutputLayout::new(dir, "txt");
    let envs = environments(&layout, &["e1", "e2"]);
    Controller::new(options, layout, envs)
}

fn packages(names: &[&str]) -> OptionValue {
    OptionValue::Multiple(names.iter().map(|n| (*n).to_owned()).collect())
}

#[test]
fn default_options_upgrade_everything() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(dir.path(), &Options::new());

    assert_eq!(ctl.build_arguments("e1"), vec!["--rebuild", "--no-header", "--upgrade"]);
    assert!(ctl.should_compile("e1"));
    assert!(ctl.should_compile("e2"));
}

#[test]
fn selective_upgrade_only_touches_pinning_environments() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("e1.txt"), "foo==1.0\n").unwrap();
    std::fs::write(dir.path().join("e2.txt"), "bar==2.0\n").unwrap();
    let options = Options::new()
        .with("upgrade", OptionValue::Flag(true))
        .with("upgrade_packages", packages(&["foo"]));
    let ctl = controller(dir.path(), &options);

    assert!(!ctl.upgrade_all().enabled());
    assert!(ctl.should_compile("e1"));
    assert!(!ctl.should_compile("e2"));
    assert_eq!(
        ctl.build_arguments("e1"),
        vec!["--rebuild", "--no-header", "--upgrade-package=foo"]
    );
    assert_eq!(ctl.build_arguments("e2"), vec!["--rebuild", "--no-header"]);
}

#[test]
fn arguments_follow_registration_order() {
    let dir = tempfile::tempdir().unwrap();
    let options = Options::new()
        .with("generate_hashes", packages(&["e1"]))
        .with("forbid_post", packages(&["e1"]))
        .with("compatible", packages(&["*"]));
    let ctl = controller(dir.path(), &options).with_static_args(vec!["--quiet".into()]);

    assert_eq!(
        ctl.build_arguments("e1"),
        vec!["--quiet", "--upgrade", "--generate-hashes"]
    );
    assert_eq!(ctl.build_arguments("e2"), vec!["--quiet", "--upgrade"]);
}

#[test]
fn repeated_builds_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("e1.txt"), "foo==1.0\nbaz==3.0\n").unwrap();
    let options = Options::new()
        .with("upgrade_packages", packages(&["baz", "foo"]))
        .with("generate_hashes", packages(&["e1"]));
    let ctl = controller(dir.path(), &options);

    let first = ctl.build_arguments("e1");
    for _ in 0..5 {
        assert_eq!(ctl.build_arguments("e1"), first);
    }
    assert_eq!(
        first,
        vec![
            "--rebuild",
            "--no-header",
            "--upgrade-package=baz",
            "--upgrade-package=foo",
            "--generate-hashes",
        ]
    );
}

#[test]
fn output_path_matches_environment_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(dir.path(), &Options::new());
    let env = ctl.environment("e1").expect("e1");

    assert_eq!(ctl.compose_output_file_path("e1"), env.output);
    assert_eq!(
        ctl.compose_output_file_path("e1"),
        ctl.layout().compose_output_file_path("e1")
    );
}

#[test]
fn reset_rereads_outputs_written_since() {
    let dir = tempfile::tempdir().unwrap();
    let options = Options::new().with("upgrade_packages", packages(&["foo"]));
    let ctl = controller(dir.path(), &options);
    assert!(!ctl.should_compile("e2"));

    std::fs::write(dir.path().join("e2.txt"), "foo==1.0\n").unwrap();
    assert!(!ctl.should_compile("e2"));
    ctl.reset();
    assert!(ctl.should_compile("e2"));
    assert!(ctl.upgrade_selected().active());
}

#[test]
fn descriptors_are_registered_in_order() {
    let names: Vec<&str> = Controller::option_descriptors()
        .iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(
        names,
        vec!["upgrade", "upgrade_packages", "generate_hashes", "forbid_post", "compatible"]
    );

    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(dir.path(), &Options::new());
    let registered: Vec<&str> = ctl.features().iter().map(|f| f.descriptor().name).collect();
    assert_eq!(registered, names);
}
