//! Rule evaluation backends.
//!
//! The runner only needs "ruleset text + document text -> diagnostics", so
//! the engine is a trait. `SpectralCli` shells out to the Spectral CLI in an
//! isolated temporary directory; closures implement the trait for tests.

use crate::error::{Error, Result};
use crate::models::Diagnostic;
use serde::Deserialize;
use serde_json::Value as Json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::debug;

/// Ruleset file name inside the staging directory.
pub const RULESET_FILE: &str = ".spectral.yaml";
/// Document file name inside the staging directory.
pub const DOCUMENT_FILE: &str = "document.yaml";

pub trait Engine {
    /// Evaluate `document` against the complete ruleset text `ruleset`.
    fn evaluate(&self, ruleset: &str, document: &str) -> Result<Vec<Diagnostic>>;
}

impl<F> Engine for F
where
    F: Fn(&str, &str) -> Result<Vec<Diagnostic>>,
{
    fn evaluate(&self, ruleset: &str, document: &str) -> Result<Vec<Diagnostic>> {
        self(ruleset, document)
    }
}

/// Spectral command line runner.
pub struct SpectralCli {
    command: Vec<String>,
    functions: Option<PathBuf>,
}

impl SpectralCli {
    /// `command` is the program followed by leading arguments,
    /// e.g. `["npx", "@stoplight/spectral-cli"]`.
    pub fn new(command: Vec<String>) -> Self {
        SpectralCli {
            command,
            functions: None,
        }
    }

    /// Copy custom rule functions from `dir` next to every staged ruleset.
    /// Ignored when `dir` does not exist.
    pub fn with_functions(mut self, dir: PathBuf) -> Self {
        if dir.is_dir() {
            self.functions = Some(dir);
        }
        self
    }

    /// Create the staging directory. It is removed when the guard drops.
    pub fn stage(&self, ruleset: &str, document: &str) -> Result<TempDir> {
        let staging = tempfile::Builder::new()
            .prefix("specter-")
            .tempdir()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        let root = staging.path();
        write(&root.join(RULESET_FILE), ruleset)?;
        write(&root.join(DOCUMENT_FILE), document)?;
        if let Some(src) = self.functions.as_ref() {
            let dst = root.join("functions");
            fs::create_dir_all(&dst).map_err(|e| Error::io(&dst, e))?;
            for entry in fs::read_dir(src).map_err(|e| Error::io(src, e))? {
                let entry = entry.map_err(|e| Error::io(src, e))?;
                let path = entry.path();
                if path.is_file() {
                    let to = dst.join(entry.file_name());
                    fs::copy(&path, &to).map_err(|e| Error::io(&path, e))?;
                }
            }
        }
        Ok(staging)
    }
}

impl Engine for SpectralCli {
    fn evaluate(&self, ruleset: &str, document: &str) -> Result<Vec<Diagnostic>> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| Error::Engine("engine command is empty".into()))?;
        let staging = self.stage(ruleset, document)?;
        debug!(dir = %staging.path().display(), program = %program, "running spectral");
        let output = Command::new(program)
            .args(args)
            .args([
                "lint",
                DOCUMENT_FILE,
                "--ruleset",
                RULESET_FILE,
                "--format",
                "json",
                "--quiet",
            ])
            .current_dir(staging.path())
            .output()
            .map_err(|e| Error::Engine(format!("cannot run {}: {}", program, e)))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        // Spectral exits non-zero when it has findings; only an empty or
        // unreadable report is a failure.
        if stdout.trim().is_empty() && !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Engine(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }
        parse_report(&stdout)
    }
}

fn write(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::io(path, e))
}

#[derive(Deserialize)]
struct RawResult {
    code: Json,
    #[serde(default)]
    message: String,
    range: RawRange,
}

#[derive(Deserialize)]
struct RawRange {
    start: RawPosition,
    end: RawPosition,
}

#[derive(Deserialize)]
struct RawPosition {
    line: usize,
}

/// Parse Spectral's `--format json` output.
pub fn parse_report(stdout: &str) -> Result<Vec<Diagnostic>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<RawResult> = serde_json::from_str(trimmed)
        .map_err(|e| Error::Engine(format!("unreadable spectral output: {}", e)))?;
    Ok(raw
        .into_iter()
        .map(|r| Diagnostic {
            code: match r.code {
                Json::String(s) => s,
                other => other.to_string(),
            },
            range: crate::models::LineRange {
                start: r.range.start.line,
                end: r.range.end.line,
            },
            message: r.message,
        })
        .collect())
}
