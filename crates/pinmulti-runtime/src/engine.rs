//! Engine that compiles every environment of a run.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use pinmulti_common::error::{PinmultiError, Result};
use pinmulti_common::types::{EnvName, Environment};
use pinmulti_compose::graph::DependencyGraph;
use pinmulti_core::Controller;
use pinmulti_core::package_cache::parse_pinned_names;

use crate::backend::{CompileRequest, ResolverBackend};
use crate::hash::hash_file;
use crate::lockfile::{Fixup, fix_lockfile};

/// What happened to one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvOutcome {
    /// The resolver ran and the output was rewritten.
    Compiled,
    /// No requested upgrade touches the environment.
    Skipped,
    /// Not scheduled because an earlier level failed under fail-fast.
    Cancelled,
    /// Compilation failed.
    Failed(String),
}

impl fmt::Display for EnvOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compiled => write!(f, "compiled"),
            Self::Skipped => write!(f, "skipped"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Outcomes of a run, in compilation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Per-environment outcomes.
    pub outcomes: Vec<(EnvName, EnvOutcome)>,
}

impl RunReport {
    /// Environments with the given outcome kind.
    fn matching(&self, pred: impl Fn(&EnvOutcome) -> bool) -> Vec<&EnvName> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| pred(outcome))
            .map(|(name, _)| name)
            .collect()
    }

    /// Environments that were compiled.
    #[must_use]
    pub fn compiled(&self) -> Vec<&EnvName> {
        self.matching(|o| *o == EnvOutcome::Compiled)
    }

    /// Environments skipped as unaffected.
    #[must_use]
    pub fn skipped(&self) -> Vec<&EnvName> {
        self.matching(|o| *o == EnvOutcome::Skipped)
    }

    /// Environments that failed.
    #[must_use]
    pub fn failed(&self) -> Vec<&EnvName> {
        self.matching(|o| matches!(o, EnvOutcome::Failed(_)))
    }

    /// Whether no environment failed or was cancelled.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, o)| matches!(o, EnvOutcome::Compiled | EnvOutcome::Skipped))
    }
}

/// Coordinates feature decisions, the resolver backend, and post-processing.
pub struct Engine {
    controller: Controller,
    backend: Box<dyn ResolverBackend>,
    header: Option<String>,
    fail_fast: bool,
    jobs: usize,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("controller", &self.controller)
            .field("backend", &self.backend.name())
            .field("fail_fast", &self.fail_fast)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine compiling `controller`'s environments with `backend`.
    #[must_use]
    pub fn new(controller: Controller, backend: Box<dyn ResolverBackend>) -> Self {
        Self {
            controller,
            backend,
            header: None,
            fail_fast: false,
            jobs: std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        }
    }

    /// Sets custom header text for generated files.
    #[must_use]
    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header;
        self
    }

    /// Stops scheduling new levels once an environment has failed.
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Limits the number of environments compiled at once.
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// The controller driving this engine.
    #[must_use]
    pub const fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Compiles every environment in dependency order.
    ///
    /// Environments within one level run concurrently. A failing
    /// environment does not stop its siblings.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment references form a cycle.
    pub fn run(&self) -> Result<RunReport> {
        self.controller.reset();
        let levels = DependencyGraph::from_environments(self.controller.environments())
            .parallel_levels()?;
        tracing::info!(levels = levels.len(), backend = self.backend.name(), "starting compilation");

        let mut report = RunReport::default();
        let mut halted = false;
        for level in &levels {
            if halted {
                report
                    .outcomes
                    .extend(level.iter().map(|n| (EnvName::new(n.as_str()), EnvOutcome::Cancelled)));
                continue;
            }
            let outcomes = self.run_level(level);
            halted = self.fail_fast
                && outcomes
                    .iter()
                    .any(|(_, o)| matches!(o, EnvOutcome::Failed(_)));
            report.outcomes.extend(outcomes);
        }

        self.controller.warn_unpinned_upgrades();
        tracing::info!(
            compiled = report.compiled().len(),
            skipped = report.skipped().len(),
            failed = report.failed().len(),
            "compilation finished"
        );
        Ok(report)
    }

    /// Runs `level` on up to `jobs` workers pulling from a shared queue.
    ///
    /// Outcomes keep the order of `level`.
    fn run_level(&self, level: &[String]) -> Vec<(EnvName, EnvOutcome)> {
        let next = AtomicUsize::new(0);
        let mut slots: Vec<Option<EnvOutcome>> = vec![None; level.len()];
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.jobs.min(level.len()))
                .map(|_| {
                    scope.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(name) = level.get(index) else { break };
                            done.push((index, self.compile_environment(name)));
                        }
                        done
                    })
                })
                .collect();
            for handle in handles {
                let Ok(done) = handle.join() else { continue };
                for (index, outcome) in done {
                    slots[index] = Some(outcome);
                }
            }
        });
        level
            .iter()
            .zip(slots)
            .map(|(name, slot)| {
                let outcome = slot.unwrap_or_else(|| EnvOutcome::Failed("worker panicked".into()));
                (EnvName::new(name.as_str()), outcome)
            })
            .collect()
    }

    fn compile_environment(&self, env_name: &str) -> EnvOutcome {
        let Some(env) = self.controller.environment(env_name) else {
            return EnvOutcome::Failed(format!("unknown environment {env_name}"));
        };
        if !self.controller.should_compile(env_name) {
            tracing::info!(env = env_name, "skipping, no requested package is pinned here");
            return EnvOutcome::Skipped;
        }
        match self.try_compile(env) {
            Ok(()) => {
                tracing::info!(env = env_name, "compiled");
                EnvOutcome::Compiled
            }
            Err(e) => {
                tracing::error!(env = env_name, error = %e, "compilation failed");
                EnvOutcome::Failed(e.to_string())
            }
        }
    }

    fn try_compile(&self, env: &Environment) -> Result<()> {
        let name = env.name.as_str();
        let request = CompileRequest {
            env: env.name.clone(),
            input: env.input.clone(),
            output: self.controller.compose_output_file_path(name),
            args: self.controller.build_arguments(name),
        };
        self.backend.compile(&request)?;

        let content = read(&request.output)?;
        let input_hash = hash_file(&request.input)?;
        let fixup = Fixup {
            input_hash: &input_hash,
            header: self.header.as_deref(),
            reference_files: env
                .references
                .iter()
                .map(|r| self.controller.layout().output_file_name(r.as_str()))
                .collect(),
            inherited: self.inherited_pins(env)?,
            compatible: self.controller.compatible(),
        };
        let fixed = fix_lockfile(&content, &fixup);
        std::fs::write(&request.output, &fixed).map_err(|e| PinmultiError::Io {
            path: request.output.clone(),
            source: e,
        })?;

        let posts = self.controller.forbid_post().find_post_releases(name, &fixed);
        if !posts.is_empty() {
            return Err(PinmultiError::PostRelease {
                env: name.to_owned(),
                packages: posts,
            });
        }
        Ok(())
    }

    /// Packages pinned by every environment `env` references, transitively,
    /// as written by this run.
    fn inherited_pins(&self, env: &Environment) -> Result<BTreeSet<String>> {
        let mut pins = BTreeSet::new();
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut pending: Vec<&EnvName> = env.references.iter().collect();
        while let Some(reference) = pending.pop() {
            if !seen.insert(reference.as_str()) {
                continue;
            }
            let path = self.controller.compose_output_file_path(reference.as_str());
            if path.exists() {
                pins.extend(parse_pinned_names(&read(&path)?));
            }
            if let Some(referenced) = self.controller.environment(reference.as_str()) {
                pending.extend(referenced.references.iter());
            }
        }
        Ok(pins)
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|e| PinmultiError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}
