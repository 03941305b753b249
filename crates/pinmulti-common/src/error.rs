//! Unified error types for the pinmulti workspace.
//!
//! Missing prior output, malformed pin lines, and conflicting upgrade
//! options are not errors: they resolve to inert defaults where they occur.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum PinmultiError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The external resolver exited unsuccessfully.
    #[error("resolver failed for environment {env} ({status}): {stderr}")]
    Resolver {
        /// Environment being compiled.
        env: String,
        /// Exit status description.
        status: String,
        /// Captured standard error output.
        stderr: String,
    },

    /// Post-release versions were pinned in an environment that forbids them.
    #[error("environment {env} pins post-release versions: {}", .packages.join(", "))]
    PostRelease {
        /// Environment that forbids post-releases.
        env: String,
        /// Offending `name==version` pins.
        packages: Vec<String>,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PinmultiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_release_lists_packages() {
        let err = PinmultiError::PostRelease {
            env: "base".into(),
            packages: vec!["foo==1.0.post1".into(), "bar==2.post3".into()],
        };
        assert_eq!(
            err.to_string(),
            "environment base pins post-release versions: foo==1.0.post1, bar==2.post3"
        );
    }

    #[test]
    fn resolver_error_mentions_environment() {
        let err = PinmultiError::Resolver {
            env: "test".into(),
            status: "exit status: 2".into(),
            stderr: "no matching distribution".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("test"), "got: {msg}");
        assert!(msg.contains("no matching distribution"), "got: {msg}");
    }
}
