//! Verification that compiled outputs match their current inputs.

use std::fmt;

use pinmulti_common::error::{PinmultiError, Result};
use pinmulti_common::types::{EnvName, Environment};

use crate::hash::{hash_file, recorded_hash};

/// Result of checking one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStatus {
    /// The recorded digest matches the input file.
    Ok,
    /// The output file does not exist.
    MissingOutput,
    /// The output file carries no digest header.
    MissingHeader,
    /// The input changed since the output was compiled.
    Mismatch {
        /// Digest recorded in the output.
        recorded: String,
        /// Digest of the current input.
        actual: String,
    },
}

impl fmt::Display for VerifyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::MissingOutput => write!(f, "output file missing"),
            Self::MissingHeader => write!(f, "no hash header"),
            Self::Mismatch { .. } => write!(f, "input changed since last compile"),
        }
    }
}

/// Verification outcome for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Environment checked.
    pub env: EnvName,
    /// What was found.
    pub status: VerifyStatus,
}

impl VerifyOutcome {
    /// Whether the environment passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == VerifyStatus::Ok
    }
}

/// Checks every environment's output header against its input digest.
///
/// # Errors
///
/// Returns an error if an input file cannot be read, or an existing output
/// file cannot be read.
pub fn verify_environments(environments: &[Environment]) -> Result<Vec<VerifyOutcome>> {
    environments
        .iter()
        .map(|env| {
            let status = verify_environment(env)?;
            if status == VerifyStatus::Ok {
                tracing::info!(env = %env.name, "verified");
            } else {
                tracing::warn!(env = %env.name, %status, "verification failed");
            }
            Ok(VerifyOutcome {
                env: env.name.clone(),
                status,
            })
        })
        .collect()
}

fn verify_environment(env: &Environment) -> Result<VerifyStatus> {
    let actual = hash_file(env.input())?;
    let content = match std::fs::read_to_string(env.output()) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(VerifyStatus::MissingOutput);
        }
        Err(e) => {
            return Err(PinmultiError::Io {
                path: env.output().to_path_buf(),
                source: e,
            });
        }
    };
    Ok(match recorded_hash(&content) {
        None => VerifyStatus::MissingHeader,
        Some(recorded) if recorded == actual => VerifyStatus::Ok,
        Some(recorded) => VerifyStatus::Mismatch {
            recorded: recorded.to_owned(),
            actual,
        },
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pinmulti_common::types::OutputLayout;

    use super::*;
    use crate::hash::header_line;

    fn env(dir: &Path, name: &str, input: &str) -> Environment {
        let path = dir.join(format!("{name}.in"));
        std::fs::write(&path, input).unwrap();
        Environment::new(name, path, &OutputLayout::new(dir, "txt"), Vec::new())
    }

    #[test]
    fn reports_each_status() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = env(dir.path(), "fresh", "django\n");
        let stale = env(dir.path(), "stale", "flask\n");
        let bare = env(dir.path(), "bare", "pytest\n");
        let missing = env(dir.path(), "missing", "sphinx\n");

        let digest = hash_file(fresh.input()).unwrap();
        std::fs::write(fresh.output(), format!("{}\ndjango==4.2\n", header_line(&digest))).unwrap();
        std::fs::write(stale.output(), format!("{}\nflask==2.0\n", header_line("0000"))).unwrap();
        std::fs::write(bare.output(), "pytest==7.4\n").unwrap();

        let outcomes =
            verify_environments(&[fresh, stale, bare, missing]).expect("verification runs");
        assert!(outcomes[0].is_ok());
        assert!(matches!(outcomes[1].status, VerifyStatus::Mismatch { ref recorded, .. } if recorded == "0000"));
        assert_eq!(outcomes[2].status, VerifyStatus::MissingHeader);
        assert_eq!(outcomes[3].status, VerifyStatus::MissingOutput);
    }

    #[test]
    fn unreadable_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path(), "txt");
        let ghost = Environment::new("ghost", dir.path().join("ghost.in"), &layout, Vec::new());
        assert!(verify_environments(&[ghost]).is_err());
    }
}
