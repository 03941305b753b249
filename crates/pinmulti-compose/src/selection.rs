//! `--only-name` filtering.

use std::collections::BTreeSet;

use pinmulti_common::error::{PinmultiError, Result};
use pinmulti_common::types::Environment;

/// Keeps the named environments plus everything they transitively reference.
///
/// An empty `only_names` keeps every environment. Discovery order is kept.
///
/// # Errors
///
/// Returns an error if a requested name was not discovered.
pub fn select_environments(
    environments: Vec<Environment>,
    only_names: &[String],
) -> Result<Vec<Environment>> {
    if only_names.is_empty() {
        return Ok(environments);
    }

    let mut keep: BTreeSet<&str> = BTreeSet::new();
    let mut pending: Vec<&str> = Vec::new();
    for name in only_names {
        if !environments.iter().any(|e| e.name.as_str() == name) {
            return Err(PinmultiError::NotFound {
                kind: "environment",
                id: name.clone(),
            });
        }
        pending.push(name);
    }

    while let Some(name) = pending.pop() {
        if !keep.insert(name) {
            continue;
        }
        if let Some(env) = environments.iter().find(|e| e.name.as_str() == name) {
            pending.extend(env.references.iter().map(|r| r.as_str()));
        }
    }

    let keep: BTreeSet<String> = keep.into_iter().map(str::to_owned).collect();
    tracing::info!(?keep, "restricted run to selected environments");
    Ok(environments
        .into_iter()
        .filter(|e| keep.contains(e.name.as_str()))
        .collect())
}
