//! Resolver backend abstraction.
//!
//! The engine never solves constraints itself; it hands a composed argument
//! list to a backend that writes the output file.

pub mod pip_compile;

use std::path::PathBuf;

use pinmulti_common::error::Result;
use pinmulti_common::types::EnvName;

pub use pip_compile::PipCompile;

/// Everything a backend needs to compile one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    /// Environment being compiled.
    pub env: EnvName,
    /// Input constraints file.
    pub input: PathBuf,
    /// Output file to create or overwrite.
    pub output: PathBuf,
    /// Static and feature arguments, in order.
    pub args: Vec<String>,
}

/// External constraint resolver.
///
/// Implementors block until the output file is written or the resolver
/// has failed.
pub trait ResolverBackend: Send + Sync {
    /// Compiles `request.input` into `request.output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolver cannot be started or exits
    /// unsuccessfully.
    fn compile(&self, request: &CompileRequest) -> Result<()>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
