//! Post-processing of freshly compiled output files.
//!
//! The resolver writes a flat list of pins. Pins already provided by a
//! referenced environment are dropped and replaced by `-r` lines, matching
//! packages are relaxed to `~=`, and a header recording the input digest is
//! prepended.

use std::collections::BTreeSet;

use pinmulti_common::constants::PIN_DELIMITER;
use pinmulti_core::compatible::Compatible;

use crate::hash::header_line;

/// Inputs for rewriting one environment's output.
#[derive(Debug)]
pub struct Fixup<'a> {
    /// Hex digest of the environment's input file.
    pub input_hash: &'a str,
    /// Custom header text placed after the digest line.
    pub header: Option<&'a str>,
    /// Output file names of directly referenced environments.
    pub reference_files: Vec<String>,
    /// Lower-cased packages pinned by referenced environments, transitively.
    pub inherited: BTreeSet<String>,
    /// Compatible-release policy.
    pub compatible: &'a Compatible,
}

/// Rewrites resolver output according to `fixup`.
#[must_use]
pub fn fix_lockfile(content: &str, fixup: &Fixup<'_>) -> String {
    let mut out: Vec<String> = vec![header_line(fixup.input_hash)];
    if let Some(header) = fixup.header {
        out.extend(header.lines().map(str::to_owned));
    }
    out.extend(fixup.reference_files.iter().map(|f| format!("-r {f}")));

    let mut dropping = false;
    for line in content.lines() {
        if is_continuation(line) {
            if !dropping {
                out.push(line.to_owned());
            }
            continue;
        }
        dropping = false;
        if let Some(name) = pin_name(line) {
            if fixup.inherited.contains(&name) {
                tracing::debug!(package = %name, "dropping pin inherited from a reference");
                dropping = true;
                continue;
            }
            out.push(fixup.compatible.rewrite_pin(line).into_owned());
        } else {
            out.push(line.to_owned());
        }
    }

    let mut fixed = out.join("\n");
    fixed.push('\n');
    fixed
}

/// Lower-cased package name of a top-level pin line.
fn pin_name(line: &str) -> Option<String> {
    if line.starts_with('#') {
        return None;
    }
    line.split_once(PIN_DELIMITER)
        .map(|(name, _)| name.trim().to_lowercase())
}

/// Indented lines (`--hash=...`, `# via ...`) belong to the pin above them.
fn is_continuation(line: &str) -> bool {
    line.starts_with(char::is_whitespace) && !line.trim().is_empty()
}
