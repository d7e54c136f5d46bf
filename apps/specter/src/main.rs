//! Specter CLI binary entry point.
//! Delegates to the library pipeline and prints results.

use clap::Parser;
use specter::cli::{Cli, Commands, CorpusArgs};
use specter::config::{self, Overrides};
use specter::output;
use specter::pipeline;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Test,
    Merge,
    TestThenMerge,
}

fn main() {
    let filter = EnvFilter::try_from_env("SPECTER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (mode, args) = match cli.cmd {
        Some(Commands::Version) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Some(Commands::Test { args }) => (Mode::Test, args),
        Some(Commands::Merge { args }) => (Mode::Merge, args),
        None => (Mode::TestThenMerge, cli.args),
    };
    std::process::exit(run(mode, args));
}

/// Run one command and return the process exit code.
fn run(mode: Mode, args: CorpusArgs) -> i32 {
    let dir = PathBuf::from(args.dir.as_deref().unwrap_or("."));
    let overrides = Overrides {
        base: args.base,
        target: args.target,
        output: args.output,
        engine: args.engine,
    };
    let eff = match config::resolve_effective(&dir, &overrides) {
        Ok(eff) => eff,
        Err(e) => {
            let color = output::use_colors(overrides.output.as_deref().unwrap_or("human"));
            eprintln!("{} {}", output::error_prefix(color), e);
            return 2;
        }
    };
    let color = output::colors_for(&eff);
    if eff.output != "json" && eff.config_file.is_none() {
        eprintln!(
            "{} No specter.toml found; using defaults.",
            output::note_prefix(color)
        );
    }
    tracing::info!(dir = %eff.rules_dir.display(), "loading rules");

    let mut corpus = match pipeline::load_corpus(&eff) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", output::error_prefix(color), e);
            return 2;
        }
    };

    let run = match mode {
        Mode::Merge => None,
        Mode::Test | Mode::TestThenMerge => {
            let engine = pipeline::spectral_engine(&eff);
            Some(pipeline::test_corpus(&corpus, &engine, &eff))
        }
    };
    let failed = run.as_ref().is_some_and(|r| !r.passed());

    let mut merged = None;
    if mode != Mode::Test && !failed {
        match pipeline::merge_corpus(&mut corpus, &eff) {
            Ok(path) => merged = Some(path),
            Err(e) => {
                output::print_notices(&corpus.notices, &eff.output);
                eprintln!("{} {}", output::error_prefix(color), e);
                return 2;
            }
        }
    }

    output::print_notices(&corpus.notices, &eff.output);
    output::print_run(&corpus.notices, run.as_ref(), merged.as_deref(), &eff.output);
    if failed {
        1
    } else {
        0
    }
}
