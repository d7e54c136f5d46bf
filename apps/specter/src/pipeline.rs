//! End-to-end steps shared by the CLI commands: load, test, merge.

use crate::config::Effective;
use crate::engine::{Engine, SpectralCli};
use crate::error::{Error, Result};
use crate::index::{build_index, RuleIndex};
use crate::markdown::Extractor;
use crate::models::Notices;
use crate::parse::Dialect;
use crate::ruleset::{check_merged, load_base, merge_ruleset, write_ruleset};
use crate::runner::{run_tests, TestRun};
use std::path::PathBuf;
use tracing::debug;

/// Everything read from a rules directory.
pub struct Corpus {
    pub base: String,
    pub index: RuleIndex,
    pub notices: Notices,
}

/// Read the base ruleset and index the markdown files.
///
/// The directory is checked first, then the base, so either one missing
/// fails before any parsing.
pub fn load_corpus(eff: &Effective) -> Result<Corpus> {
    if !eff.rules_dir.is_dir() {
        return Err(Error::MissingDirectory(eff.rules_dir.clone()));
    }
    let base = load_base(&eff.rules_dir, &eff.base)?;
    let extractor = Extractor::new(&eff.fence)?;
    let dialect = Dialect::new(&eff.marker)?;
    let (index, notices) = build_index(&eff.rules_dir, &extractor, &dialect)?;
    debug!(rules = index.len(), notices = notices.len(), "corpus loaded");
    Ok(Corpus {
        base,
        index,
        notices,
    })
}

/// The engine configured for `eff`.
pub fn spectral_engine(eff: &Effective) -> SpectralCli {
    SpectralCli::new(eff.engine.clone()).with_functions(eff.rules_dir.join(&eff.functions))
}

pub fn test_corpus<E: Engine + ?Sized>(corpus: &Corpus, engine: &E, eff: &Effective) -> TestRun {
    run_tests(engine, &corpus.base, eff.indent, &corpus.index)
}

/// Merge all indexed rules and write the target ruleset.
pub fn merge_corpus(corpus: &mut Corpus, eff: &Effective) -> Result<PathBuf> {
    let merged = merge_ruleset(
        &corpus.base,
        corpus.index.rules().map(|r| r.body.as_str()),
        eff.indent,
    );
    let target = eff.rules_dir.join(&eff.target);
    check_merged(&merged, &target, &mut corpus.notices);
    write_ruleset(&eff.rules_dir, &eff.target, &merged)
}
