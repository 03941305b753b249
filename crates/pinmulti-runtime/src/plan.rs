//! Dry-run view of what a compilation would do.

use pinmulti_common::error::Result;
use pinmulti_compose::graph::DependencyGraph;
use pinmulti_core::Controller;
use serde::Serialize;

/// Planned action for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// Environment name.
    pub env: String,
    /// Parallel level the environment is compiled in.
    pub level: usize,
    /// Whether the resolver would run.
    pub compile: bool,
    /// Composed resolver arguments.
    pub arguments: Vec<String>,
    /// Referenced environments.
    pub references: Vec<String>,
    /// Output file that would be written.
    pub output: String,
}

/// Computes the plan for every environment, in compilation order.
///
/// Reads existing output files but never invokes the resolver.
///
/// # Errors
///
/// Returns an error if the environment references form a cycle.
pub fn plan(controller: &Controller) -> Result<Vec<PlanEntry>> {
    controller.reset();
    let levels = DependencyGraph::from_environments(controller.environments()).parallel_levels()?;

    let mut entries = Vec::new();
    for (level, names) in levels.iter().enumerate() {
        for name in names {
            let references: Vec<String> = controller
                .environment(name)
                .map(|env| env.references.iter().map(ToString::to_string).collect())
                .unwrap_or_default();
            entries.push(PlanEntry {
                env: name.clone(),
                level,
                compile: controller.should_compile(name),
                arguments: controller.build_arguments(name),
                references,
                output: controller
                    .compose_output_file_path(name)
                    .display()
                    .to_string(),
            });
        }
    }
    Ok(entries)
}
