//! Shared data models for extracted rules, test cases and run results.

pub mod notice;

pub use notice::{Level, Notice, NoticeKind, Notices};

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A fenced code block lifted out of a markdown file.
pub struct Block {
    /// Text between the opening fence line and the closing fence.
    pub content: String,
    /// 1-based file line of the first content line.
    pub line: usize,
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A named Spectral rule as documented in markdown.
pub struct RuleDefinition {
    pub name: String,
    /// Rule text without its tag line, starting with the `name:` key.
    pub body: String,
    /// 1-based file line of the rule name.
    pub line: usize,
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
/// What a test case expects from one rule.
///
/// `line` is a 0-based index into the test case content, not the file.
pub enum Expectation {
    NotFailAnywhere,
    FailAnywhere,
    NotFailAt { line: usize },
    FailAt { line: usize },
    FailCount { count: usize },
}

impl Expectation {
    /// Content line this expectation is bound to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Expectation::NotFailAt { line } | Expectation::FailAt { line } => Some(*line),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assertion {
    pub rule: String,
    #[serde(flatten)]
    pub expectation: Expectation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A YAML sample plus the assertions embedded in its comments.
pub struct TestCase {
    pub content: String,
    pub assertions: Vec<Assertion>,
    /// 1-based file line of the first content line.
    pub line: usize,
    pub file: PathBuf,
}

impl TestCase {
    /// Distinct rule names targeted by this test case, in first-seen order.
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for a in &self.assertions {
            if !names.contains(&a.rule.as_str()) {
                names.push(a.rule.as_str());
            }
        }
        names
    }

    /// Assertions that target `rule`.
    pub fn assertions_for<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Assertion> {
        self.assertions.iter().filter(move |a| a.rule == rule)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Inclusive range of 0-based lines within the evaluated document.
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn covers(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single finding reported by the rule engine.
pub struct Diagnostic {
    /// Name of the rule that produced it.
    pub code: String,
    pub range: LineRange,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl Diagnostic {
    pub fn new(code: impl Into<String>, start: usize, end: usize) -> Self {
        Diagnostic {
            code: code.into(),
            range: LineRange { start, end },
            message: String::new(),
        }
    }
}
