//! Ruleset generation: the base document plus rule bodies appended as text.
//!
//! The base ruleset is expected to end with the `rules:` mapping, so each
//! rule body is indented one level and appended after it. No YAML tree is
//! built; `check_merged` only verifies the result still parses.

use crate::error::{Error, Result};
use crate::models::{NoticeKind, Notices};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Read the base ruleset from the corpus directory.
pub fn load_base(dir: &Path, base: &str) -> Result<String> {
    let path = dir.join(base);
    if !path.is_file() {
        return Err(Error::MissingBase(path));
    }
    fs::read_to_string(&path).map_err(|e| Error::io(&path, e))
}

/// Append `bodies` to `base`, each line indented by `indent` spaces.
pub fn merge_ruleset<'a>(
    base: &str,
    bodies: impl IntoIterator<Item = &'a str>,
    indent: usize,
) -> String {
    let pad = " ".repeat(indent);
    let mut out = String::from(base.trim_end_matches('\n'));
    out.push('\n');
    for body in bodies {
        for line in body.trim_end_matches('\n').lines() {
            if !line.trim().is_empty() {
                out.push_str(&pad);
                out.push_str(line);
            }
            out.push('\n');
        }
    }
    out
}

/// Record an `invalid-merge` notice when `merged` is not valid YAML.
pub fn check_merged(merged: &str, file: &Path, notices: &mut Notices) -> bool {
    match serde_yaml::from_str::<serde_yaml::Value>(merged) {
        Ok(_) => true,
        Err(e) => {
            let line = e.location().map(|l| l.line());
            notices.push(
                NoticeKind::InvalidMerge,
                file,
                line,
                format!("Merged ruleset is not valid YAML: {}", e),
            );
            false
        }
    }
}

/// Write the merged ruleset next to the markdown files.
pub fn write_ruleset(dir: &Path, target: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(target);
    fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
    info!(path = %path.display(), "wrote merged ruleset");
    Ok(path)
}
