//! Non-fatal findings collected while indexing, testing and merging.
//!
//! Library code never prints; it records a `Notice` and keeps going. The
//! binary decides how to render them (see `output`).

use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    /// A second definition of an already indexed rule name.
    DuplicateRule,
    /// A test case naming a rule that is never defined.
    OrphanTestCase,
    /// A marker the parser does not understand, or one missing its arguments.
    UnknownMarker,
    /// A marker written inside a rule definition.
    MarkerInRule,
    UntestedRule,
    /// A fenced block that is neither a rule nor a test case.
    SkippedBlock,
    /// The merged ruleset does not parse as YAML.
    InvalidMerge,
}

impl NoticeKind {
    pub fn level(self) -> Level {
        match self {
            NoticeKind::DuplicateRule | NoticeKind::InvalidMerge => Level::Error,
            NoticeKind::OrphanTestCase | NoticeKind::UnknownMarker | NoticeKind::MarkerInRule => {
                Level::Warning
            }
            NoticeKind::UntestedRule | NoticeKind::SkippedBlock => Level::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub level: Level,
    pub file: PathBuf,
    /// 1-based file line, when the finding has a location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
/// Ordered collector of notices.
pub struct Notices(Vec<Notice>);

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: NoticeKind,
        file: &Path,
        line: Option<usize>,
        message: impl Into<String>,
    ) {
        self.0.push(Notice {
            kind,
            level: kind.level(),
            file: file.to_path_buf(),
            line,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notice> {
        self.0.iter()
    }

    pub fn of_kind(&self, kind: NoticeKind) -> impl Iterator<Item = &Notice> {
        self.0.iter().filter(move |n| n.kind == kind)
    }

    pub fn count(&self, level: Level) -> usize {
        self.0.iter().filter(|n| n.level == level).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Notices {
    type Item = &'a Notice;
    type IntoIter = std::slice::Iter<'a, Notice>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
