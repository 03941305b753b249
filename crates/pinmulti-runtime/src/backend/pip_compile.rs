//! `pip-compile` resolver backend.

use std::path::PathBuf;
use std::process::Command;

use pinmulti_common::constants::BIN_NAME;
use pinmulti_common::error::{PinmultiError, Result};

use super::{CompileRequest, ResolverBackend};

/// Runs an external `pip-compile` compatible program once per environment.
#[derive(Debug, Clone)]
pub struct PipCompile {
    program: PathBuf,
}

impl PipCompile {
    /// Uses `program` as given, without searching `PATH`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves `program` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be found.
    pub fn locate(program: &str) -> Result<Self> {
        let path = which::which(program).map_err(|e| PinmultiError::NotFound {
            kind: "resolver",
            id: format!("{program} ({e})"),
        })?;
        tracing::debug!(path = %path.display(), "located resolver");
        Ok(Self::new(path))
    }
}

impl ResolverBackend for PipCompile {
    fn compile(&self, request: &CompileRequest) -> Result<()> {
        tracing::info!(env = %request.env, args = ?request.args, "invoking resolver");

        let output = Command::new(&self.program)
            .args(&request.args)
            .arg("--output-file")
            .arg(&request.output)
            .arg(&request.input)
            .env("CUSTOM_COMPILE_COMMAND", BIN_NAME)
            .output()
            .map_err(|e| PinmultiError::Io {
                path: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(PinmultiError::Resolver {
                env: request.env.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resolver")
    }
}
