//! `pinmulti plan` - Display what a recompile would do.

use std::process::ExitCode;

use clap::Args;
use pinmulti_core::Controller;

use crate::output::format_command_line;

use super::{GlobalArgs, load_environments};

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Print the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `plan` command.
///
/// Discovers environments, resolves their compilation levels, and shows
/// for each one whether the resolver would run and with which arguments.
///
/// # Errors
///
/// Returns an error if discovery, validation, or level resolution fails.
pub fn execute(args: &GlobalArgs, plan_args: &PlanArgs) -> anyhow::Result<ExitCode> {
    let config = args.run_config();
    let environments = load_environments(&config)?;
    let controller = Controller::new(&args.options(), config.layout(), environments);
    let entries = pinmulti_runtime::plan::plan(&controller)?;

    if plan_args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("Compilation Plan for: {}", config.directory.display());
    println!("{}", "\u{2550}".repeat(35));
    println!();

    for entry in &entries {
        let sign = if entry.compile { '+' } else { '=' };
        println!("  {sign} {} (level {})", entry.env, entry.level);
        if !entry.references.is_empty() {
            println!("      references: {}", entry.references.join(", "));
        }
        if entry.compile {
            println!(
                "      {} {}",
                config.resolver,
                format_command_line(&entry.arguments)
            );
        } else {
            println!("      unchanged: no requested package is pinned here");
        }
        println!("      output: {}", entry.output);
    }

    let compiled = entries.iter().filter(|e| e.compile).count();
    println!();
    println!(
        "  {compiled} of {} environment(s) will be compiled.",
        entries.len()
    );

    Ok(ExitCode::SUCCESS)
}
