//! Feature registry and per-environment compilation decisions.

use std::path::PathBuf;
use std::sync::Arc;

use pinmulti_common::config::Options;
use pinmulti_common::types::{Environment, OutputLayout};

use crate::compatible::Compatible;
use crate::feature::{Feature, OptionDescriptor};
use crate::hashes::GenerateHashes;
use crate::post::ForbidPost;
use crate::upgrade::{UpgradeAll, UpgradePolicy, UpgradeSelected};

/// Resolver arguments passed to every environment before feature arguments.
pub const DEFAULT_STATIC_ARGS: &[&str] = &["--rebuild", "--no-header"];

/// Owns the environments of a run and every registered feature.
///
/// Features are consulted in registration order: upgrade-all,
/// upgrade-selected, generate-hashes, forbid-post, compatible.
#[derive(Debug)]
pub struct Controller {
    layout: OutputLayout,
    environments: Vec<Environment>,
    static_args: Vec<String>,
    upgrade_all: UpgradeAll,
    upgrade_selected: Arc<UpgradeSelected>,
    generate_hashes: GenerateHashes,
    forbid_post: ForbidPost,
    compatible: Compatible,
}

impl Controller {
    /// Builds every feature from the option snapshot.
    #[must_use]
    pub fn new(options: &Options, layout: OutputLayout, environments: Vec<Environment>) -> Self {
        let upgrade_selected = Arc::new(UpgradeSelected::new(options, layout.clone()));
        let selective: Arc<dyn UpgradePolicy> = upgrade_selected.clone();
        let controller = Self {
            upgrade_all: UpgradeAll::new(options, selective),
            upgrade_selected,
            generate_hashes: GenerateHashes::new(options),
            forbid_post: ForbidPost::new(options),
            compatible: Compatible::new(options),
            static_args: DEFAULT_STATIC_ARGS.iter().map(|&a| a.to_owned()).collect(),
            layout,
            environments,
        };
        for feature in controller.features() {
            tracing::debug!(
                option = feature.descriptor().name,
                value = ?feature.option_value(),
                "feature configured"
            );
        }
        controller
    }

    /// Replaces the static arguments placed before feature arguments.
    #[must_use]
    pub fn with_static_args(mut self, args: Vec<String>) -> Self {
        self.static_args = args;
        self
    }

    /// Option descriptors of every registered feature, in registration order.
    #[must_use]
    pub fn option_descriptors() -> [&'static OptionDescriptor; 5] {
        [
            &UpgradeAll::OPTION,
            &UpgradeSelected::OPTION,
            &GenerateHashes::OPTION,
            &ForbidPost::OPTION,
            &Compatible::OPTION,
        ]
    }

    /// Registered features in registration order.
    pub fn features(&self) -> [&dyn Feature; 5] {
        [
            &self.upgrade_all,
            self.upgrade_selected.as_ref(),
            &self.generate_hashes,
            &self.forbid_post,
            &self.compatible,
        ]
    }

    /// Output file path for `env_name`.
    #[must_use]
    pub fn compose_output_file_path(&self, env_name: &str) -> PathBuf {
        self.layout.compose_output_file_path(env_name)
    }

    /// Static arguments followed by each feature's contribution.
    pub fn build_arguments(&self, env_name: &str) -> Vec<String> {
        let mut args = self.static_args.clone();
        for feature in self.features() {
            args.extend(feature.pin_options(env_name));
        }
        tracing::debug!(env = env_name, ?args, "composed resolver arguments");
        args
    }

    /// Whether `env_name` must be recompiled this run.
    pub fn should_compile(&self, env_name: &str) -> bool {
        self.upgrade_selected.affected(env_name)
    }

    /// Starts a fresh run: pins cached from earlier queries are dropped.
    pub fn reset(&self) {
        self.upgrade_selected.reset();
    }

    /// Environments of this run, in discovery order.
    #[must_use]
    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    /// Looks up an environment by name.
    #[must_use]
    pub fn environment(&self, env_name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name.as_str() == env_name)
    }

    /// Output layout shared with the pin cache.
    #[must_use]
    pub const fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// The full-upgrade feature.
    #[must_use]
    pub const fn upgrade_all(&self) -> &UpgradeAll {
        &self.upgrade_all
    }

    /// The selective-upgrade feature.
    #[must_use]
    pub fn upgrade_selected(&self) -> &UpgradeSelected {
        &self.upgrade_selected
    }

    /// The post-release rejection feature.
    #[must_use]
    pub const fn forbid_post(&self) -> &ForbidPost {
        &self.forbid_post
    }

    /// The compatible-release feature.
    #[must_use]
    pub const fn compatible(&self) -> &Compatible {
        &self.compatible
    }

    /// Warns about requested upgrades pinned in no environment.
    pub fn warn_unpinned_upgrades(&self) {
        let names = self.environments.iter().map(|e| e.name.as_str());
        for package in self.upgrade_selected.unpinned_packages(names) {
            tracing::warn!(package, "requested upgrade of a package not pinned in any environment");
        }
    }
}
