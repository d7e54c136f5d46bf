//! Output rendering for test and merge commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form carries the
//! notices, per-rule reports and a top-level summary.

use crate::config::Effective;
use crate::models::{Level, Notice, NoticeKind, Notices};
use crate::runner::{CaseReport, RuleReport, TestRun};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Color decision once the config file has been merged in.
pub fn colors_for(eff: &Effective) -> bool {
    use_colors(&eff.output)
}

pub fn error_prefix(color: bool) -> String {
    if color {
        "⟦error⟧".red().bold().to_string()
    } else {
        "⟦error⟧".to_string()
    }
}

pub fn note_prefix(color: bool) -> String {
    if color {
        "⟦note⟧".blue().bold().to_string()
    } else {
        "⟦note⟧".to_string()
    }
}

/// Show `path` relative to the working directory when possible.
pub fn display_path(path: &Path) -> String {
    if path.is_absolute() {
        if let Some(rel) = std::env::current_dir()
            .ok()
            .and_then(|cwd| pathdiff::diff_paths(path, cwd))
        {
            return rel.to_string_lossy().to_string();
        }
    }
    path.to_string_lossy().to_string()
}

fn location(path: &Path, line: usize) -> String {
    format!("{}:{}", display_path(path), line)
}

/// Render one notice as a single line.
pub fn render_notice(n: &Notice, color: bool) -> String {
    let (icon, sev) = match n.level {
        Level::Error => ("✖", "⟦error⟧"),
        Level::Warning => ("▲", "⟦warn⟧"),
        Level::Info => ("◆", "⟦info⟧"),
    };
    let loc = match n.line {
        Some(line) => location(&n.file, line),
        None => display_path(&n.file),
    };
    let kind = serde_json::to_value(n.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    if !color {
        return format!("{} {} {} ❲{}❳ — {}", icon, sev, loc, kind, n.message);
    }
    let (icon, sev) = match n.level {
        Level::Error => (icon.red().to_string(), sev.red().bold().to_string()),
        Level::Warning => (icon.yellow().to_string(), sev.yellow().bold().to_string()),
        Level::Info => (icon.blue().to_string(), sev.blue().bold().to_string()),
    };
    format!("{} {} {} ❲{}❳ — {}", icon, sev, loc.bold(), kind, n.message)
}

fn render_case(case: &CaseReport, color: bool, out: &mut Vec<String>) {
    let loc = location(&case.file, case.line);
    if case.passed() {
        let ok = format!("  ✅ Test OK ({})", loc);
        out.push(if color { ok.green().to_string() } else { ok });
        return;
    }
    if let Some(err) = case.error.as_ref() {
        let msg = format!("  ❌ Test errored ({}): {}", loc, err);
        out.push(if color { msg.red().to_string() } else { msg });
    }
    for f in &case.failures {
        let msg = format!("  ❌ {} ({})", f.message, location(&case.file, f.line));
        out.push(if color { msg.red().to_string() } else { msg });
        for r in &f.observed {
            out.push(format!(
                "     observed lines {}-{} ({})",
                r.start,
                r.end,
                location(&case.file, case.line + r.start)
            ));
        }
    }
}

fn render_rule(rule: &RuleReport, color: bool, out: &mut Vec<String>) {
    let head = format!("👻 {} ({})", rule.rule, location(&rule.file, rule.line));
    out.push(if color { head.bold().to_string() } else { head });
    for case in &rule.cases {
        render_case(case, color, out);
    }
}

/// Human rendering of a test run, one entry per output line.
pub fn render_run(run: &TestRun, color: bool) -> Vec<String> {
    let mut out = Vec::new();
    for rule in &run.rules {
        render_rule(rule, color, &mut out);
    }
    let s = &run.summary;
    let summary = format!(
        "— Summary — rules={} untested={} cases={} passed={} failed={}",
        s.rules, s.untested, s.cases, s.passed, s.failed
    );
    out.push(if color { summary.bold().to_string() } else { summary });
    out
}

/// Print notices to stderr. Skipped blocks are only shown in json output.
pub fn print_notices(notices: &Notices, output: &str) {
    if output == "json" {
        return;
    }
    let color = use_colors(output);
    for n in notices.iter().filter(|n| n.kind != NoticeKind::SkippedBlock) {
        eprintln!("{}", render_notice(n, color));
    }
}

/// Print test results (and the merged file, when one was written).
pub fn print_run(notices: &Notices, run: Option<&TestRun>, merged: Option<&Path>, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_json(notices, run, merged))
                .unwrap_or_else(|_| "{}".to_string())
        ),
        _ => {
            let color = use_colors(output);
            if let Some(run) = run {
                for line in render_run(run, color) {
                    println!("{}", line);
                }
            }
            if let Some(path) = merged {
                let msg = format!("✅ Spectral rules merged in the file: {}", display_path(path));
                println!("{}", if color { msg.green().bold().to_string() } else { msg });
            }
        }
    }
}

/// Compose the JSON document (pure) for testing/snapshot purposes.
pub fn compose_json(notices: &Notices, run: Option<&TestRun>, merged: Option<&Path>) -> JsonVal {
    json!({
        "notices": notices,
        "rules": run.map(|r| &r.rules),
        "summary": run.map(|r| &r.summary),
        "merged": merged.map(display_path),
    })
}
