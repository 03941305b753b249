//! `pinmulti` - Recompile every affected environment.

use std::process::ExitCode;
use std::time::Instant;

use pinmulti_core::Controller;
use pinmulti_runtime::backend::PipCompile;
use pinmulti_runtime::engine::{Engine, EnvOutcome};

use crate::output::{BOLD, DIM, GREEN, RED, RESET, YELLOW};

use super::{GlobalArgs, load_environments};

/// Executes the default recompile command.
///
/// # Errors
///
/// Returns an error if environments cannot be loaded, the resolver cannot
/// be found, or the references form a cycle. Failures of individual
/// environments are reported and turn into a non-zero exit code.
pub fn execute(args: &GlobalArgs) -> anyhow::Result<ExitCode> {
    let started = Instant::now();
    let config = args.run_config();
    let environments = load_environments(&config)?;

    let header = config
        .header
        .as_deref()
        .map(std::fs::read_to_string)
        .transpose()
        .map_err(|e| anyhow::anyhow!("failed to read header file: {e}"))?;

    let controller = Controller::new(&args.options(), config.layout(), environments);
    let backend = PipCompile::locate(&config.resolver)?;
    let mut engine = Engine::new(controller, Box::new(backend))
        .with_header(header)
        .with_fail_fast(config.fail_fast);
    if let Some(jobs) = config.jobs {
        engine = engine.with_jobs(jobs);
    }

    let report = engine.run()?;

    eprintln!();
    for (name, outcome) in &report.outcomes {
        let marker = match outcome {
            EnvOutcome::Compiled => format!("{GREEN}●{RESET}"),
            EnvOutcome::Skipped | EnvOutcome::Cancelled => format!("{DIM}○{RESET}"),
            EnvOutcome::Failed(_) => format!("{RED}✗{RESET}"),
        };
        eprintln!("  {marker} {BOLD}{name}{RESET} {DIM}{outcome}{RESET}");
    }
    eprintln!();

    if report.is_success() {
        eprintln!(
            "  {GREEN}{BOLD}Compiled {}{RESET} environment(s), skipped {} in {:.1}s.",
            report.compiled().len(),
            report.skipped().len(),
            started.elapsed().as_secs_f64()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "  {YELLOW}{BOLD}{} environment(s) failed.{RESET}",
            report.failed().len()
        );
        Ok(ExitCode::FAILURE)
    }
}
