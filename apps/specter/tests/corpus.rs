use specter::config::{resolve_effective, Effective, Overrides};
use specter::models::{Diagnostic, NoticeKind};
use specter::pipeline::{load_corpus, merge_corpus, test_corpus};
use specter::{Error, Result};
use std::fs;
use tempfile::{tempdir, TempDir};

const BASE: &str = "extends: spectral:oas\nrules:\n";

/// Flags every document line containing `# bad` for the rule under test.
fn fake_spectral(ruleset: &str, document: &str) -> Result<Vec<Diagnostic>> {
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(ruleset).map_err(|e| Error::Engine(e.to_string()))?;
    let rule = parsed["rules"]
        .as_mapping()
        .and_then(|m| m.keys().next())
        .and_then(|k| k.as_str())
        .ok_or_else(|| Error::Engine("no rule in ruleset".into()))?
        .to_string();
    Ok(document
        .lines()
        .enumerate()
        .filter(|(_, l)| l.contains("# bad"))
        .map(|(i, _)| Diagnostic::new(rule.clone(), i, i))
        .collect())
}

fn corpus(files: &[(&str, &str)]) -> (TempDir, Effective) {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join("spectral.base.yaml"), BASE).unwrap();
    for (name, text) in files {
        fs::write(dir.path().join(name), text).unwrap();
    }
    let eff = resolve_effective(dir.path(), &Overrides::default()).unwrap();
    (dir, eff)
}

const TITLE_RULES: &str = r#"# Info rules

The title must not be empty.

```yaml
#👻-rule
no-empty-title:
  given: $.info.title
  then:
    function: truthy
```

```yaml
openapi: 3.1.0
info:
  title: "" # bad #👻-fails-here: no-empty-title
```

An example without markers is ignored:

```yaml
openapi: 3.1.0
info:
  title: ""
```
"#;

#[test]
fn scenario_fail_at_line_passes() {
    let (_dir, eff) = corpus(&[("info.md", TITLE_RULES)]);
    let corpus = load_corpus(&eff).unwrap();
    let entry = corpus.index.get("no-empty-title").unwrap();
    // the block without markers is not a test case
    assert_eq!(entry.test_cases.len(), 1);
    assert_eq!(entry.test_cases[0].assertions.len(), 1);

    let run = test_corpus(&corpus, &fake_spectral, &eff);
    assert!(run.passed());
    assert_eq!(run.summary.cases, 1);
    assert_eq!(run.summary.passed, 1);
}

#[test]
fn scenario_failing_assertion_is_reported_and_run_continues() {
    let extra = r#"
```yaml
#👻-rule
must-have-owner:
  given: $.info
```

```yaml
info: # bad #👻-does-not-fail-anywhere: must-have-owner
  title: x
```
"#;
    let wrong = r#"
```yaml
info:
  title: "" #👻-fails-here: no-empty-title
```
"#;
    let (_dir, eff) = corpus(&[("a.md", extra), ("b.md", wrong), ("c.md", TITLE_RULES)]);
    let corpus = load_corpus(&eff).unwrap();
    let run = test_corpus(&corpus, &fake_spectral, &eff);
    assert!(!run.passed());
    assert_eq!(run.summary.rules, 2);
    assert_eq!(run.summary.cases, 3);
    assert_eq!(run.summary.failed, 2);
    let owner = run.rules.iter().find(|r| r.rule == "must-have-owner").unwrap();
    assert_eq!(owner.cases[0].failures.len(), 1);
}

#[test]
fn scenario_duplicate_rule_first_wins_in_merge() {
    let first = "```yaml\n#👻-rule\nmust-have-owner:\n  given: $.info.x-owner\n```\n";
    let second = "```yaml\n#👻-rule\nmust-have-owner:\n  given: $.info.contact\n```\n";
    let (dir, eff) = corpus(&[("a.md", first), ("b.md", second)]);
    let mut corpus = load_corpus(&eff).unwrap();
    assert_eq!(corpus.notices.of_kind(NoticeKind::DuplicateRule).count(), 1);

    let path = merge_corpus(&mut corpus, &eff).unwrap();
    assert_eq!(path, dir.path().join("spectral.yaml"));
    let merged = fs::read_to_string(&path).unwrap();
    assert!(merged.starts_with(BASE));
    assert!(merged.contains("$.info.x-owner"));
    assert!(!merged.contains("$.info.contact"));
    assert_eq!(corpus.notices.of_kind(NoticeKind::InvalidMerge).count(), 0);
}

#[test]
fn scenario_orphan_test_case_is_excluded() {
    let orphan = "```yaml\ninfo: # bad #👻-fails-here: typo-rule-nmae\n```\n";
    let (_dir, eff) = corpus(&[("info.md", TITLE_RULES), ("typo.md", orphan)]);
    let mut corpus = load_corpus(&eff).unwrap();
    assert_eq!(corpus.notices.of_kind(NoticeKind::OrphanTestCase).count(), 1);
    assert!(corpus.index.get("typo-rule-nmae").is_none());

    let run = test_corpus(&corpus, &fake_spectral, &eff);
    assert!(run.passed());
    assert_eq!(run.summary.cases, 1);

    let path = merge_corpus(&mut corpus, &eff).unwrap();
    let merged = fs::read_to_string(path).unwrap();
    assert!(!merged.contains("typo-rule-nmae"));
}

#[test]
fn missing_base_is_fatal() {
    let (dir, eff) = corpus(&[("info.md", TITLE_RULES)]);
    fs::remove_file(dir.path().join("spectral.base.yaml")).unwrap();
    let err = load_corpus(&eff).err().unwrap();
    assert!(matches!(err, Error::MissingBase(_)));
    assert!(!dir.path().join("spectral.yaml").exists());
}

#[test]
fn missing_rules_directory_is_reported_before_base() {
    let (dir, mut eff) = corpus(&[]);
    eff.rules_dir = dir.path().join("nope");
    let err = load_corpus(&eff).err().unwrap();
    assert!(matches!(err, Error::MissingDirectory(ref p) if *p == dir.path().join("nope")));
}
