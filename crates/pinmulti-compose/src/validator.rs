//! Static checks on discovered environments.
//!
//! Reference errors are reported before the cycle check so that they name
//! the offending environment instead of surfacing as graph failures.

use std::collections::HashSet;

use pinmulti_common::error::{PinmultiError, Result};
use pinmulti_common::types::Environment;

use crate::graph::DependencyGraph;

/// Validates a set of environments for semantic correctness.
///
/// # Checks performed
///
/// 1. No duplicate environment names.
/// 2. No environment references itself.
/// 3. Every reference names a discovered environment.
/// 4. References form no cycle.
///
/// # Errors
///
/// Returns an error if any check fails.
pub fn validate(environments: &[Environment]) -> Result<()> {
    tracing::debug!(count = environments.len(), "validating environments");
    check_duplicate_names(environments)?;
    check_references(environments)?;
    let order = DependencyGraph::from_environments(environments).resolve_order()?;
    tracing::debug!(?order, "environments validated");
    Ok(())
}

fn check_duplicate_names(environments: &[Environment]) -> Result<()> {
    let mut seen = HashSet::new();
    for env in environments {
        if !seen.insert(&env.name) {
            return Err(PinmultiError::Config {
                message: format!("duplicate environment name: \"{}\"", env.name),
            });
        }
    }
    Ok(())
}

fn check_references(environments: &[Environment]) -> Result<()> {
    let names: HashSet<&str> = environments.iter().map(|e| e.name.as_str()).collect();

    for env in environments {
        for reference in &env.references {
            if reference == &env.name {
                return Err(PinmultiError::Config {
                    message: format!("environment \"{}\" references itself", env.name),
                });
            }
            if !names.contains(reference.as_str()) {
                return Err(PinmultiError::NotFound {
                    kind: "environment",
                    id: format!("\"{reference}\" referenced by \"{}\"", env.name),
                });
            }
        }
    }
    Ok(())
}
