//! Corpus-wide index of rules and the test cases that exercise them.
//!
//! Merge policy while indexing:
//! - The first definition of a rule name wins; later ones are reported as
//!   `duplicate-rule` and dropped.
//! - A test case is attached to every distinct rule it asserts on, in
//!   arrival order.
//! - Names that only ever appear in test cases are reported as
//!   `orphan-test-case` and left out of the final index.

use crate::error::{Error, Result};
use crate::markdown::{normalize_line_endings, Extractor};
use crate::models::{NoticeKind, Notices, RuleDefinition, TestCase};
use crate::parse::{Dialect, Parsed};
use glob::glob;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
/// A defined rule and its test cases.
pub struct RuleEntry {
    pub rule: RuleDefinition,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Default)]
/// Rules in first-definition order.
pub struct RuleIndex {
    entries: Vec<RuleEntry>,
}

impl RuleIndex {
    pub fn get(&self, name: &str) -> Option<&RuleEntry> {
        self.entries.iter().find(|e| e.rule.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleEntry> {
        self.entries.iter()
    }

    pub fn rules(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.entries.iter().map(|e| &e.rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Pending {
    name: String,
    rule: Option<RuleDefinition>,
    test_cases: Vec<TestCase>,
}

/// Incremental index builder, fed one markdown document at a time.
pub struct Indexer<'a> {
    extractor: &'a Extractor,
    dialect: &'a Dialect,
    pending: Vec<Pending>,
    positions: HashMap<String, usize>,
    notices: Notices,
}

impl<'a> Indexer<'a> {
    pub fn new(extractor: &'a Extractor, dialect: &'a Dialect) -> Self {
        Indexer {
            extractor,
            dialect,
            pending: Vec::new(),
            positions: HashMap::new(),
            notices: Notices::new(),
        }
    }

    fn slot(&mut self, name: &str) -> &mut Pending {
        let idx = match self.positions.get(name) {
            Some(&i) => i,
            None => {
                self.pending.push(Pending {
                    name: name.to_string(),
                    rule: None,
                    test_cases: Vec::new(),
                });
                self.positions.insert(name.to_string(), self.pending.len() - 1);
                self.pending.len() - 1
            }
        };
        &mut self.pending[idx]
    }

    pub fn add_document(&mut self, file: &Path, text: &str) {
        let text = normalize_line_endings(text);
        let (extractor, dialect) = (self.extractor, self.dialect);
        let mut found = 0usize;
        for block in extractor.blocks(file, &text) {
            found += 1;
            match dialect.classify(&block, &mut self.notices) {
                Parsed::Rule(rule) => self.add_rule(rule),
                Parsed::TestCase(tc) => self.add_test_case(tc),
                Parsed::Skipped => {
                    debug!(file = %file.display(), line = block.line, "skipping block");
                    self.notices.push(
                        NoticeKind::SkippedBlock,
                        file,
                        Some(block.line),
                        "Block is neither a rule nor a test case",
                    );
                }
            }
        }
        debug!(file = %file.display(), blocks = found, "indexed document");
    }

    fn add_rule(&mut self, rule: RuleDefinition) {
        let name = rule.name.clone();
        let slot = self.slot(&name);
        if let Some(first) = slot.rule.as_ref() {
            let message = format!(
                "Rule {} is defined in both {}:{} and {}:{}",
                name,
                first.file.display(),
                first.line,
                rule.file.display(),
                rule.line
            );
            self.notices
                .push(NoticeKind::DuplicateRule, &rule.file, Some(rule.line), message);
            return;
        }
        slot.rule = Some(rule);
    }

    fn add_test_case(&mut self, tc: TestCase) {
        let names: Vec<String> = tc.rule_names().into_iter().map(str::to_string).collect();
        for name in names {
            self.slot(&name).test_cases.push(tc.clone());
        }
    }

    /// Drop orphans and report untested rules.
    pub fn finish(mut self) -> (RuleIndex, Notices) {
        let mut entries = Vec::new();
        for p in self.pending {
            match p.rule {
                Some(rule) => {
                    if p.test_cases.is_empty() {
                        self.notices.push(
                            NoticeKind::UntestedRule,
                            &rule.file,
                            Some(rule.line),
                            format!("Rule {} has no test cases", rule.name),
                        );
                    }
                    entries.push(RuleEntry {
                        rule,
                        test_cases: p.test_cases,
                    });
                }
                None => {
                    // a pending slot always holds a rule or at least one test case
                    if let Some(first) = p.test_cases.first() {
                        let extra = match p.test_cases.len() {
                            1 => String::new(),
                            n => format!(" ({} test cases)", n),
                        };
                        self.notices.push(
                            NoticeKind::OrphanTestCase,
                            &first.file,
                            Some(first.line),
                            format!("Test case for unknown rule: {}{}", p.name, extra),
                        );
                    }
                }
            }
        }
        (RuleIndex { entries }, self.notices)
    }
}

/// Markdown files directly inside `dir`, in sorted order.
pub fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy())).join("*.md");
    let entries = glob(&pattern.to_string_lossy()).map_err(|e| {
        Error::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e.msg),
        )
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::io(path, e.into())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Index every markdown file of `dir`.
pub fn build_index(
    dir: &Path,
    extractor: &Extractor,
    dialect: &Dialect,
) -> Result<(RuleIndex, Notices)> {
    if !dir.is_dir() {
        return Err(Error::MissingDirectory(dir.to_path_buf()));
    }
    let mut indexer = Indexer::new(extractor, dialect);
    for file in markdown_files(dir)? {
        let text = fs::read_to_string(&file).map_err(|e| Error::io(&file, e))?;
        indexer.add_document(&file, &text);
    }
    Ok(indexer.finish())
}
