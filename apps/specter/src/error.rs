//! Fatal errors surfaced by the library.
//!
//! Only conditions that stop a run are errors. Recoverable findings such as
//! duplicate rules or unknown markers are collected as `Notice` values.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("rules directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("base ruleset not found: {}", .0.display())]
    MissingBase(PathBuf),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid fence or marker pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("rule engine failed: {0}")]
    Engine(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
