//! Domain primitive types used across the pinmulti workspace.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name identifying one environment (`base`, `test`, `docs`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnvName(String);

impl EnvName {
    /// Creates a new environment name from a string value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EnvName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Where compiled output files live and how they are named.
///
/// The resolver invocation and the pin cache both derive output paths
/// through [`OutputLayout::compose_output_file_path`] so they always agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    /// Directory holding input and output files.
    pub directory: PathBuf,
    /// Extension of output files, without the leading dot.
    pub out_ext: String,
}

impl OutputLayout {
    /// Creates a layout for the given directory and output extension.
    ///
    /// A leading dot on `out_ext` is stripped.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, out_ext: &str) -> Self {
        Self {
            directory: directory.into(),
            out_ext: out_ext.trim_start_matches('.').to_owned(),
        }
    }

    /// Returns the output file name for an environment (`base.txt`).
    #[must_use]
    pub fn output_file_name(&self, env_name: &str) -> String {
        format!("{env_name}.{}", self.out_ext)
    }

    /// Returns the output file path for an environment.
    #[must_use]
    pub fn compose_output_file_path(&self, env_name: &str) -> PathBuf {
        self.directory.join(self.output_file_name(env_name))
    }
}

/// One discovered environment: an input file compiled into an output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment name, the input file stem.
    pub name: EnvName,
    /// Path of the input constraints file.
    pub input: PathBuf,
    /// Path of the compiled output file.
    pub output: PathBuf,
    /// Environments whose pins constrain this one.
    pub references: Vec<EnvName>,
}

impl Environment {
    /// Creates an environment whose output path follows `layout`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        input: impl Into<PathBuf>,
        layout: &OutputLayout,
        references: Vec<EnvName>,
    ) -> Self {
        let name = EnvName::new(name);
        let output = layout.compose_output_file_path(name.as_str());
        Self {
            name,
            input: input.into(),
            output,
            references,
        }
    }

    /// Returns the input file path.
    #[must_use]
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Returns the output file path.
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }
}
