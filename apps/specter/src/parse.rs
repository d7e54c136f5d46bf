//! Classification of extracted blocks into rules and test cases.
//!
//! A block whose first line carries the rule tag (`#👻-rule` by default) is
//! a rule definition; its next line names the rule. Any other block is a
//! test case when at least one assertion marker appears in it:
//!
//! ```yaml
//! info:
//!   title: ""   #👻-fails-here: no-empty-title
//! #👻-failures: 1 no-empty-title
//! ```
//!
//! Marker lines are matched by a single pattern and dispatched on the tag, so
//! the closed set of assertion kinds lives in [`Dialect::parse_marker`].

use crate::error::Result;
use crate::models::{Assertion, Block, Expectation, NoticeKind, Notices, RuleDefinition, TestCase};
use regex::Regex;

pub const DEFAULT_MARKER: &str = "#👻-";

const RULE_TAG: &str = "rule";

/// Outcome of parsing a single marker occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Assertion(Assertion),
    /// Tag not in the recognized set; empty when nothing follows the sentinel.
    Unknown(String),
    /// Recognized tag with missing or invalid arguments.
    Malformed(String),
}

/// What a block turned out to be.
#[derive(Debug)]
pub enum Parsed {
    Rule(RuleDefinition),
    TestCase(TestCase),
    Skipped,
}

/// Marker syntax used by a corpus.
pub struct Dialect {
    marker: String,
    pattern: Regex,
}

impl Dialect {
    pub fn new(marker: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"{}([A-Za-z0-9_-]*):?(.*)$",
            regex::escape(marker)
        ))?;
        Ok(Dialect {
            marker: marker.to_string(),
            pattern,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether the block's first line is exactly the rule tag.
    pub fn is_rule(&self, block: &Block) -> bool {
        let first = block.content.lines().next().unwrap_or("");
        first
            .trim_start()
            .strip_prefix(self.marker.as_str())
            .and_then(|rest| rest.strip_prefix(RULE_TAG))
            .is_some_and(|tail| tail.trim().is_empty())
    }

    pub fn classify(&self, block: &Block, notices: &mut Notices) -> Parsed {
        if self.is_rule(block) {
            return Parsed::Rule(self.parse_rule(block, notices));
        }
        match self.parse_test_case(block, notices) {
            Some(tc) => Parsed::TestCase(tc),
            None => Parsed::Skipped,
        }
    }

    /// Drop the tag line and name the rule after the first remaining line.
    pub fn parse_rule(&self, block: &Block, notices: &mut Notices) -> RuleDefinition {
        let body = block
            .content
            .split_once('\n')
            .map(|(_, rest)| rest)
            .unwrap_or("");
        let line = block.line + 1;
        for (i, l) in body.lines().enumerate() {
            if l.contains(self.marker.as_str()) {
                notices.push(
                    NoticeKind::MarkerInRule,
                    &block.file,
                    Some(line + i),
                    format!("Marker ignored inside rule definition: \"{}\"", l.trim()),
                );
            }
        }
        RuleDefinition {
            name: rule_name(body),
            body: body.to_string(),
            line,
            file: block.file.clone(),
        }
    }

    /// Collect assertions from every line; `None` when there are none.
    pub fn parse_test_case(&self, block: &Block, notices: &mut Notices) -> Option<TestCase> {
        let mut assertions = Vec::new();
        for (index, line) in block.content.lines().enumerate() {
            match self.parse_marker(line, index) {
                Some(Marker::Assertion(a)) => assertions.push(a),
                Some(Marker::Unknown(tag)) => notices.push(
                    NoticeKind::UnknownMarker,
                    &block.file,
                    Some(block.line + index),
                    format!("Unknown marker \"{}{}\"", self.marker, tag),
                ),
                Some(Marker::Malformed(text)) => notices.push(
                    NoticeKind::UnknownMarker,
                    &block.file,
                    Some(block.line + index),
                    format!("Malformed marker \"{}\"", text),
                ),
                None => {}
            }
        }
        if assertions.is_empty() {
            return None;
        }
        Some(TestCase {
            content: block.content.clone(),
            assertions,
            line: block.line,
            file: block.file.clone(),
        })
    }

    /// Parse the marker on `line`, whose 0-based index in the block is `index`.
    pub fn parse_marker(&self, line: &str, index: usize) -> Option<Marker> {
        let caps = self.pattern.captures(line)?;
        let whole = caps.get(0).map_or("", |m| m.as_str()).trim();
        let tag = caps.get(1).map_or("", |m| m.as_str());
        let args: Vec<&str> = caps
            .get(2)
            .map_or("", |m| m.as_str())
            .split_whitespace()
            .collect();

        // Most specific first: every tag below is tried in this order.
        let expectation = match tag {
            "failures" => {
                let count = args.first().and_then(|c| c.parse::<usize>().ok());
                match (count, args.get(1)) {
                    (Some(count), Some(rule)) => {
                        return Some(assertion(rule, Expectation::FailCount { count }))
                    }
                    _ => return Some(Marker::Malformed(whole.to_string())),
                }
            }
            "does-not-fail-anywhere" => Expectation::NotFailAnywhere,
            "fails-anywhere" => Expectation::FailAnywhere,
            "does-not-fail-here" => Expectation::NotFailAt { line: index },
            "fails-here" => Expectation::FailAt { line: index },
            other => return Some(Marker::Unknown(other.to_string())),
        };
        match args.first() {
            Some(rule) => Some(assertion(rule, expectation)),
            None => Some(Marker::Malformed(whole.to_string())),
        }
    }
}

fn assertion(rule: &str, expectation: Expectation) -> Marker {
    Marker::Assertion(Assertion {
        rule: rule.to_string(),
        expectation,
    })
}

/// First body line with surrounding whitespace and its trailing colon removed.
pub fn rule_name(body: &str) -> String {
    let first = body.lines().next().unwrap_or("").trim();
    first.strip_suffix(':').unwrap_or(first).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn block(content: &str) -> Block {
        Block {
            content: content.to_string(),
            line: 10,
            file: PathBuf::from("rules.md"),
        }
    }

    fn dialect() -> Dialect {
        Dialect::new(DEFAULT_MARKER).unwrap()
    }

    #[test]
    fn test_parse_rule_name_and_body() {
        let mut notices = Notices::new();
        let b = block("#👻-rule\nno-empty-title:\n  given: $.info.title\n");
        assert!(dialect().is_rule(&b));
        let rule = dialect().parse_rule(&b, &mut notices);
        assert_eq!(rule.name, "no-empty-title");
        assert_eq!(rule.body, "no-empty-title:\n  given: $.info.title\n");
        assert_eq!(rule.line, 11);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_rule_name_round_trip() {
        let d = dialect();
        let mut notices = Notices::new();
        let first = d.parse_rule(&block("#👻-rule\n  my-rule:  \n  severity: warn\n"), &mut notices);
        let rebuilt = format!("#👻-rule\n{}", first.body);
        let second = d.parse_rule(&block(&rebuilt), &mut notices);
        assert_eq!(first.name, "my-rule");
        assert_eq!(first.name, second.name);
        assert_eq!(first.body, second.body);
    }

    #[test]
    fn test_empty_rule_body_has_empty_name() {
        let mut notices = Notices::new();
        let rule = dialect().parse_rule(&block("#👻-rule"), &mut notices);
        assert_eq!(rule.name, "");
        assert_eq!(rule.body, "");
    }

    #[test]
    fn test_marker_inside_rule_is_reported() {
        let mut notices = Notices::new();
        let b = block("#👻-rule\nr:\n  given: $ #👻-fails-here: r\n");
        dialect().parse_rule(&b, &mut notices);
        let found: Vec<_> = notices.of_kind(NoticeKind::MarkerInRule).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, Some(12));
    }

    #[test]
    fn test_parse_markers() {
        let d = dialect();
        assert_eq!(
            d.parse_marker("  title: '' #👻-fails-here: no-empty-title", 3),
            Some(assertion("no-empty-title", Expectation::FailAt { line: 3 }))
        );
        assert_eq!(
            d.parse_marker("#👻-does-not-fail-here: r", 1),
            Some(assertion("r", Expectation::NotFailAt { line: 1 }))
        );
        assert_eq!(
            d.parse_marker("#👻-fails-anywhere: r", 1),
            Some(assertion("r", Expectation::FailAnywhere))
        );
        assert_eq!(
            d.parse_marker("#👻-does-not-fail-anywhere: r", 1),
            Some(assertion("r", Expectation::NotFailAnywhere))
        );
        assert_eq!(
            d.parse_marker("#👻-failures: 2 r", 1),
            Some(assertion("r", Expectation::FailCount { count: 2 }))
        );
        assert_eq!(d.parse_marker("title: plain", 0), None);
    }

    #[test]
    fn test_unknown_and_malformed_markers() {
        let d = dialect();
        assert_eq!(
            d.parse_marker("#👻-fail-here: r", 0),
            Some(Marker::Unknown("fail-here".into()))
        );
        assert_eq!(
            d.parse_marker("#👻-failures: many r", 0),
            Some(Marker::Malformed("#👻-failures: many r".into()))
        );
        assert_eq!(
            d.parse_marker("#👻-fails-here:", 0),
            Some(Marker::Malformed("#👻-fails-here:".into()))
        );
    }

    #[test]
    fn test_rule_tag_must_be_exact() {
        let d = dialect();
        assert!(d.is_rule(&block("#👻-rule  \nr:\n")));
        assert!(!d.is_rule(&block("#👻-ruleset-example\nr:\n")));
        assert!(!d.is_rule(&block("#👻-rules\nr:\n")));

        let mut notices = Notices::new();
        let b = block("#👻-ruleset-example\na: 1 #👻-fails-here: r\n");
        let parsed = d.classify(&b, &mut notices);
        assert!(matches!(parsed, Parsed::TestCase(ref tc) if tc.assertions.len() == 1));
        assert_eq!(notices.of_kind(NoticeKind::UnknownMarker).count(), 1);
    }

    #[test]
    fn test_sentinel_without_tag_is_reported() {
        let d = dialect();
        assert_eq!(
            d.parse_marker("a: 1 #👻- fails-here: r", 0),
            Some(Marker::Unknown(String::new()))
        );
        assert_eq!(d.parse_marker("#👻-", 0), Some(Marker::Unknown(String::new())));

        let mut notices = Notices::new();
        let b = block("a: 1 #👻- fails-here: r\nb: 2 #👻-fails-here: r\n");
        let tc = d.parse_test_case(&b, &mut notices).unwrap();
        assert_eq!(tc.assertions.len(), 1);
        let unknown: Vec<_> = notices.of_kind(NoticeKind::UnknownMarker).collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].line, Some(10));
    }

    #[test]
    fn test_parse_test_case_collects_assertions_and_warnings() {
        let mut notices = Notices::new();
        let b = block("info:\n  title: '' #👻-fails-here: t\n  x: 1 #👻-typo: t\n#👻-failures: 1 t\n");
        let tc = dialect().parse_test_case(&b, &mut notices).unwrap();
        assert_eq!(tc.assertions.len(), 2);
        assert_eq!(tc.assertions[0].expectation, Expectation::FailAt { line: 1 });
        assert_eq!(tc.assertions[1].expectation, Expectation::FailCount { count: 1 });
        let unknown: Vec<_> = notices.of_kind(NoticeKind::UnknownMarker).collect();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].line, Some(12));
    }

    #[test]
    fn test_block_without_markers_is_skipped() {
        let mut notices = Notices::new();
        let parsed = dialect().classify(&block("openapi: 3.1.0\ninfo: {}\n"), &mut notices);
        assert!(matches!(parsed, Parsed::Skipped));
    }

    #[test]
    fn test_custom_marker() {
        let d = Dialect::new("#spectral-").unwrap();
        let mut notices = Notices::new();
        assert!(d.is_rule(&block("#spectral-rule\nr:\n")));
        let tc = d
            .parse_test_case(&block("a: 1 #spectral-fails-here: r\n"), &mut notices)
            .unwrap();
        assert_eq!(tc.assertions[0].rule, "r");
    }
}
