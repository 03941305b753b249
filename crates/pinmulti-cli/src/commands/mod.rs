//! CLI command definitions and dispatch.

pub mod compile;
pub mod plan;
pub mod verify;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use pinmulti_common::config::{OptionValue, Options, RunConfig};
use pinmulti_common::constants::{DEFAULT_DIRECTORY, DEFAULT_IN_EXT, DEFAULT_OUT_EXT, DEFAULT_RESOLVER};
use pinmulti_common::types::Environment;
use pinmulti_core::compatible::Compatible;
use pinmulti_core::hashes::GenerateHashes;
use pinmulti_core::post::ForbidPost;
use pinmulti_core::upgrade::{UpgradeAll, UpgradeSelected};

/// pinmulti - compile interdependent requirement lock files.
#[derive(Parser, Debug)]
#[command(name = "pinmulti", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute; recompiles when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options shared by every command.
    #[command(flatten)]
    pub args: GlobalArgs,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show, per environment, whether it would be compiled and with which arguments.
    Plan(plan::PlanArgs),
    /// Check that every output's hash header matches its input file.
    Verify,
}

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory path with requirements files.
    #[arg(short, long, global = true, default_value = DEFAULT_DIRECTORY)]
    pub directory: PathBuf,

    /// File extension of input files.
    #[arg(short, long, global = true, default_value = DEFAULT_IN_EXT)]
    pub in_ext: String,

    /// File extension of output files.
    #[arg(short, long, global = true, default_value = DEFAULT_OUT_EXT)]
    pub out_ext: String,

    /// File path with custom header text for generated files.
    #[arg(long, global = true)]
    pub header: Option<PathBuf>,

    /// Compile only for passed environment names and their references.
    /// Can be supplied multiple times.
    #[arg(short = 'n', long = "only-name", global = true)]
    pub only_names: Vec<String>,

    /// Upgrade package versions (the default).
    #[arg(long, global = true, overrides_with = "no_upgrade")]
    pub upgrade: bool,

    /// Keep versions satisfying the inputs.
    #[arg(long, global = true, overrides_with = "upgrade")]
    pub no_upgrade: bool,

    /// Only upgrade named package. Can be supplied multiple times.
    #[arg(short = 'P', long = "upgrade-package", global = true)]
    pub upgrade_packages: Vec<String>,

    /// Environment name (base, test, etc) that needs packages hashes.
    /// Can be supplied multiple times.
    #[arg(short = 'g', long, global = true)]
    pub generate_hashes: Vec<String>,

    /// Environment name (base, test, etc) that cannot have packages with
    /// post-release versions (1.2.3.post777). Can be supplied multiple times.
    #[arg(long, global = true)]
    pub forbid_post: Vec<String>,

    /// Glob expression for packages with compatible (~=) version constraint.
    /// Can be supplied multiple times.
    #[arg(short, long, global = true)]
    pub compatible: Vec<String>,

    /// External resolver program.
    #[arg(long, global = true, env = "PINMULTI_RESOLVER", default_value = DEFAULT_RESOLVER)]
    pub resolver: String,

    /// Stop scheduling environments after the first failure.
    #[arg(long, global = true)]
    pub fail_fast: bool,

    /// Maximum number of environments compiled at once.
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub json_logs: bool,
}

impl GlobalArgs {
    /// Feature option snapshot for this run.
    pub fn options(&self) -> Options {
        let mut options = Options::new()
            .with(
                UpgradeSelected::OPTION.name,
                OptionValue::Multiple(self.upgrade_packages.clone()),
            )
            .with(
                GenerateHashes::OPTION.name,
                OptionValue::Multiple(self.generate_hashes.clone()),
            )
            .with(ForbidPost::OPTION.name, OptionValue::Multiple(self.forbid_post.clone()))
            .with(Compatible::OPTION.name, OptionValue::Multiple(self.compatible.clone()));
        if self.upgrade || self.no_upgrade {
            options = options.with(UpgradeAll::OPTION.name, OptionValue::Flag(self.upgrade));
        }
        options
    }

    /// Run configuration for this invocation.
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            directory: self.directory.clone(),
            in_ext: self.in_ext.clone(),
            out_ext: self.out_ext.clone(),
            header: self.header.clone(),
            only_names: self.only_names.clone(),
            resolver: self.resolver.clone(),
            fail_fast: self.fail_fast,
            jobs: self.jobs,
        }
    }
}

/// Discovers, validates, and filters the environments of a run.
///
/// # Errors
///
/// Returns an error if discovery fails, references are invalid, or an
/// `--only-name` environment does not exist.
pub fn load_environments(config: &RunConfig) -> anyhow::Result<Vec<Environment>> {
    let environments = pinmulti_compose::discovery::discover(config)?;
    pinmulti_compose::validator::validate(&environments)?;
    let selected = pinmulti_compose::selection::select_environments(environments, &config.only_names)?;
    if selected.is_empty() {
        tracing::warn!(directory = %config.directory.display(), "no environments found");
    }
    Ok(selected)
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        None => compile::execute(&cli.args),
        Some(Command::Plan(plan_args)) => plan::execute(&cli.args, &plan_args),
        Some(Command::Verify) => verify::execute(&cli.args),
    }
}
