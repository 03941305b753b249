//! Parsing of `-r` / `--requirement` lines in input files.

use std::path::Path;

use pinmulti_common::types::EnvName;

const REFERENCE_FLAGS: [&str; 2] = ["--requirement", "-r"];

/// Environments referenced by an input file.
///
/// A line `-r base.in` (or `--requirement=base.txt`) references `base` when
/// the target's extension is the input or output extension. Other targets
/// are plain includes and are ignored. Order of first appearance is kept.
#[must_use]
pub fn parse_references(content: &str, in_ext: &str, out_ext: &str) -> Vec<EnvName> {
    let mut refs: Vec<EnvName> = Vec::new();
    for line in content.lines() {
        let Some(target) = reference_target(line) else {
            continue;
        };
        let path = Path::new(target);
        let ext = path.extension().and_then(|e| e.to_str());
        if ext != Some(in_ext) && ext != Some(out_ext) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            let name = EnvName::new(stem);
            if !refs.contains(&name) {
                refs.push(name);
            }
        }
    }
    refs
}

fn reference_target(line: &str) -> Option<&str> {
    let line = line.split('#').next()?.trim();
    REFERENCE_FLAGS.iter().find_map(|flag| {
        let rest = line.strip_prefix(flag)?;
        let rest = rest
            .strip_prefix('=')
            .or_else(|| rest.starts_with(char::is_whitespace).then_some(rest))?;
        let target = rest.trim();
        (!target.is_empty()).then_some(target)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(refs: &[EnvName]) -> Vec<&str> {
        refs.iter().map(EnvName::as_str).collect()
    }

    #[test]
    fn short_and_long_flags() {
        let content = "-r base.in\n--requirement=docs.in\n--requirement  test.txt\n";
        assert_eq!(names(&parse_references(content, "in", "txt")), vec!["base", "docs", "test"]);
    }

    #[test]
    fn ignores_other_extensions_and_plain_lines() {
        let content = "django\n-r vendor/extra.cfg\n-c constraints.txt\n";
        assert!(parse_references(content, "in", "txt").is_empty());
    }

    #[test]
    fn strips_directories_and_comments() {
        let content = "-r ../shared/base.in  # shared pins\n# -r commented.in\n";
        assert_eq!(names(&parse_references(content, "in", "txt")), vec!["base"]);
    }

    #[test]
    fn duplicates_collapse() {
        let content = "-r base.in\n-r base.txt\n";
        assert_eq!(names(&parse_references(content, "in", "txt")), vec!["base"]);
    }
}
