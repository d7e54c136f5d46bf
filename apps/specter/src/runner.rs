//! Test execution: run every test case of every rule through an engine and
//! compare the diagnostics with the test case's assertions.
//!
//! Each rule is evaluated in isolation with a ruleset made of the base
//! document plus that rule alone. A test case naming several rules is run
//! once per rule, and only diagnostics whose code equals the rule under
//! test are considered. Failures never stop the run.

use crate::engine::Engine;
use crate::index::RuleIndex;
use crate::models::{Assertion, Diagnostic, Expectation, LineRange, RuleDefinition, TestCase};
use crate::ruleset::merge_ruleset;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
/// One unmet assertion.
pub struct AssertionFailure {
    pub assertion: Assertion,
    /// 1-based file line the assertion points at.
    pub line: usize,
    pub message: String,
    /// Ranges of the relevant diagnostics, relative to the test case.
    pub observed: Vec<LineRange>,
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
    pub file: PathBuf,
    pub line: usize,
    pub failures: Vec<AssertionFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.failures.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct RuleReport {
    pub rule: String,
    pub file: PathBuf,
    pub line: usize,
    pub cases: Vec<CaseReport>,
}

impl RuleReport {
    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub rules: usize,
    pub untested: usize,
    pub cases: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct TestRun {
    pub rules: Vec<RuleReport>,
    pub summary: Summary,
}

impl TestRun {
    pub fn passed(&self) -> bool {
        self.summary.failed == 0
    }
}

/// Compare `diagnostics` with the assertions `tc` makes about `rule`.
///
/// Diagnostics for other rules are ignored. Line containment is inclusive
/// on both ends of a range.
pub fn check_assertions(
    rule: &str,
    tc: &TestCase,
    diagnostics: &[Diagnostic],
) -> Vec<AssertionFailure> {
    let ranges: Vec<LineRange> = diagnostics
        .iter()
        .filter(|d| d.code == rule)
        .map(|d| d.range)
        .collect();
    let covering = |line: usize| -> Vec<LineRange> {
        ranges.iter().copied().filter(|r| r.covers(line)).collect()
    };

    let mut failures = Vec::new();
    for a in tc.assertions_for(rule) {
        let at = tc.line + a.expectation.line().unwrap_or(0);
        let failure = match a.expectation {
            Expectation::NotFailAnywhere if !ranges.is_empty() => Some((
                format!(
                    "Was not expecting rule {} to fail anywhere, but got {} failure(s)",
                    rule,
                    ranges.len()
                ),
                ranges.clone(),
            )),
            Expectation::FailAnywhere if ranges.is_empty() => Some((
                format!("Was expecting rule {} to fail somewhere", rule),
                Vec::new(),
            )),
            Expectation::NotFailAt { line } => {
                let hits = covering(line);
                (!hits.is_empty()).then(|| {
                    (
                        format!("Was not expecting rule {} to fail at line {}", rule, at),
                        hits,
                    )
                })
            }
            Expectation::FailAt { line } if covering(line).is_empty() => Some((
                format!(
                    "Was expecting rule {} to fail at line {}, but got {} failure(s) elsewhere",
                    rule,
                    at,
                    ranges.len()
                ),
                ranges.clone(),
            )),
            Expectation::FailCount { count } if ranges.len() != count => Some((
                format!(
                    "Expected {} failure(s) for rule {}, but got {}",
                    count,
                    rule,
                    ranges.len()
                ),
                ranges.clone(),
            )),
            _ => None,
        };
        if let Some((message, observed)) = failure {
            failures.push(AssertionFailure {
                assertion: a.clone(),
                line: at,
                message,
                observed,
            });
        }
    }
    failures
}

/// Evaluate one test case against a single-rule ruleset.
///
/// Engine errors are recorded on the report rather than returned.
pub fn run_test_case<E: Engine + ?Sized>(
    engine: &E,
    base: &str,
    indent: usize,
    rule: &RuleDefinition,
    tc: &TestCase,
) -> CaseReport {
    let ruleset = merge_ruleset(base, [rule.body.as_str()], indent);
    debug!(rule = %rule.name, file = %tc.file.display(), line = tc.line, "evaluating test case");
    let (failures, error) = match engine.evaluate(&ruleset, &tc.content) {
        Ok(diags) => (check_assertions(&rule.name, tc, &diags), None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };
    CaseReport {
        file: tc.file.clone(),
        line: tc.line,
        failures,
        error,
    }
}

/// Run every test case of every indexed rule, sequentially.
pub fn run_tests<E: Engine + ?Sized>(
    engine: &E,
    base: &str,
    indent: usize,
    index: &RuleIndex,
) -> TestRun {
    let mut run = TestRun::default();
    for entry in index.iter() {
        run.summary.rules += 1;
        if entry.test_cases.is_empty() {
            run.summary.untested += 1;
        }
        let cases: Vec<CaseReport> = entry
            .test_cases
            .iter()
            .map(|tc| run_test_case(engine, base, indent, &entry.rule, tc))
            .collect();
        for c in &cases {
            run.summary.cases += 1;
            if c.passed() {
                run.summary.passed += 1;
            } else {
                run.summary.failed += 1;
            }
        }
        run.rules.push(RuleReport {
            rule: entry.rule.name.clone(),
            file: entry.rule.file.clone(),
            line: entry.rule.line,
            cases,
        });
    }
    run
}
