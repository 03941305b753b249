//! `pinmulti verify` - Check output headers against input files.

use std::process::ExitCode;

use pinmulti_runtime::verify::verify_environments;

use crate::output::{BOLD, GREEN, RED, RESET};

use super::{GlobalArgs, load_environments};

/// Executes the `verify` command.
///
/// For each environment verify hash comments and report failures.
/// Exits with code 1 if any failure occurred.
///
/// # Errors
///
/// Returns an error if environments or input files cannot be read.
pub fn execute(args: &GlobalArgs) -> anyhow::Result<ExitCode> {
    let config = args.run_config();
    let environments = load_environments(&config)?;
    let outcomes = verify_environments(&environments)?;

    for outcome in &outcomes {
        if outcome.is_ok() {
            println!("  {GREEN}ok{RESET}      {BOLD}{}{RESET}", outcome.env);
        } else {
            println!("  {RED}failed{RESET}  {BOLD}{}{RESET}: {}", outcome.env, outcome.status);
        }
    }

    if outcomes.iter().all(|o| o.is_ok()) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
