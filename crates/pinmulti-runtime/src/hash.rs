//! SHA-256 digests of input files.
//!
//! Every generated output records the digest of the input it was compiled
//! from, so stale outputs can be detected without running the resolver.

use std::path::Path;

use pinmulti_common::constants::HASH_HEADER_PREFIX;
use pinmulti_common::error::{PinmultiError, Result};
use sha2::{Digest, Sha256};

/// Computes the hex-encoded SHA-256 hash of a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn hash_file(path: &Path) -> Result<String> {
    tracing::debug!(path = %path.display(), "computing SHA-256 hash");
    let content = std::fs::read(path).map_err(|e| PinmultiError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(format!("{:x}", Sha256::digest(&content)))
}

/// Header line recording `hex` as the input digest.
#[must_use]
pub fn header_line(hex: &str) -> String {
    format!("{HASH_HEADER_PREFIX}{hex}")
}

/// Digest recorded in an output file's header, if any.
#[must_use]
pub fn recorded_hash(content: &str) -> Option<&str> {
    content
        .lines()
        .take_while(|line| line.starts_with('#') || line.trim().is_empty())
        .find_map(|line| line.strip_prefix(HASH_HEADER_PREFIX))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_file_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.in");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            hash_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(hash_file(&dir.path().join("nope.in")).is_err());
    }

    #[test]
    fn header_round_trips_through_content() {
        let content = format!("{}\n# custom header\n-r base.txt\nfoo==1.0\n", header_line("beef"));
        assert_eq!(recorded_hash(&content), Some("beef"));
    }

    #[test]
    fn digest_after_body_is_ignored() {
        assert_eq!(recorded_hash("foo==1.0\n# SHA256:beef\n"), None);
    }
}
