//! Discovery of environments in the requirements directory.

use std::path::Path;

use pinmulti_common::config::RunConfig;
use pinmulti_common::error::{PinmultiError, Result};
use pinmulti_common::types::Environment;

use crate::references::parse_references;

/// Finds every `<directory>/*.<in_ext>` file and reads its references.
///
/// Environments are returned sorted by name.
///
/// # Errors
///
/// Returns an error if the directory or an input file cannot be read.
pub fn discover(config: &RunConfig) -> Result<Vec<Environment>> {
    let dir = &config.directory;
    tracing::info!(directory = %dir.display(), in_ext = config.in_ext(), "discovering environments");

    let layout = config.layout();
    let entries = std::fs::read_dir(dir).map_err(|e| io_error(dir, e))?;

    let mut environments = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(config.in_ext()) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let content = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let references = parse_references(&content, config.in_ext(), &layout.out_ext);
        tracing::debug!(env = name, ?references, "discovered environment");
        environments.push(Environment::new(name, path.clone(), &layout, references));
    }

    environments.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(environments)
}

fn io_error(path: &Path, source: std::io::Error) -> PinmultiError {
    PinmultiError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> RunConfig {
        RunConfig {
            directory: dir.to_path_buf(),
            ..RunConfig::default()
        }
    }

    #[test]
    fn finds_input_files_with_references() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.in"), "django\n").unwrap();
        std::fs::write(dir.path().join("test.in"), "-r base.in\npytest\n").unwrap();
        std::fs::write(dir.path().join("base.txt"), "django==4.2\n").unwrap();
        std::fs::write(dir.path().join("README"), "not an environment\n").unwrap();

        let envs = discover(&config(dir.path())).unwrap();
        assert_eq!(envs.len(), 2);
        assert_eq!(envs[0].name.as_str(), "base");
        assert!(envs[0].references.is_empty());
        assert_eq!(envs[1].name.as_str(), "test");
        assert_eq!(envs[1].references[0].as_str(), "base");
        assert_eq!(envs[1].output, dir.path().join("test.txt"));
    }

    #[test]
    fn custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("base.req"), "flask\n").unwrap();
        std::fs::write(dir.path().join("dev.req"), "-r base.lock\n").unwrap();
        let config = RunConfig {
            in_ext: ".req".into(),
            out_ext: "lock".into(),
            ..config(dir.path())
        };

        let envs = discover(&config).unwrap();
        assert_eq!(envs.len(), 2);
        assert_eq!(envs[1].references[0].as_str(), "base");
        assert_eq!(envs[0].output, dir.path().join("base.lock"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(&config(&dir.path().join("nope"))).unwrap_err();
        assert!(err.to_string().contains("I/O error"), "got: {err}");
    }
}
