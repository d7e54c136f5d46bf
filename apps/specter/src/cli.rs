//! CLI argument parsing via `clap`.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "specter",
    version,
    about = "Test and merge Spectral rules documented in markdown",
    long_about = "Specter extracts Spectral rules and their test cases from ```yaml blocks in markdown files, runs every test case against its rule, and merges all rules into one ruleset.\n\nWithout a subcommand, `specter <DIR>` tests and then merges when every test passes.\n\nConfiguration precedence: CLI > specter.toml > defaults.",
    after_help = "Examples:\n  specter rules/\n  specter test rules/ --output json\n  specter merge rules/ --target spectral.yaml\n  specter test rules/ --engine \"npx @stoplight/spectral-cli\"",
    args_conflicts_with_subcommands = true,
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
    #[command(flatten)]
    pub args: CorpusArgs,
}

#[derive(Args, Clone, Default)]
/// Options shared by every corpus command.
pub struct CorpusArgs {
    #[arg(help = "Directory holding the markdown rules and the base ruleset")]
    pub dir: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, help = "Base ruleset file inside DIR (default: spectral.base.yaml)")]
    pub base: Option<String>,
    #[arg(long, help = "Merged ruleset file inside DIR (default: spectral.yaml)")]
    pub target: Option<String>,
    #[arg(long, help = "Spectral command line, e.g. \"npx @stoplight/spectral-cli\"")]
    pub engine: Option<String>,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current specter version.")]
    Version,
    /// Run the test cases
    #[command(
        about = "Run rule test cases",
        long_about = "Run every test case found in the markdown files against its rule. Exits non-zero when a test case fails.",
        after_help = "Examples:\n  specter test rules/\n  specter test rules/ --output json"
    )]
    Test {
        #[command(flatten)]
        args: CorpusArgs,
    },
    /// Merge the rules without testing
    #[command(
        about = "Merge rules into one ruleset",
        long_about = "Append every rule definition to the base ruleset and write the result, without running tests.",
        after_help = "Examples:\n  specter merge rules/\n  specter merge rules/ --target out.yaml"
    )]
    Merge {
        #[command(flatten)]
        args: CorpusArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_dir_without_subcommand() {
        let cli = Cli::try_parse_from(["specter", "rules"]).unwrap();
        assert!(cli.cmd.is_none());
        assert_eq!(cli.args.dir.as_deref(), Some("rules"));
    }

    #[test]
    fn test_subcommand_with_flags() {
        let cli = Cli::try_parse_from([
            "specter", "test", "rules", "--output", "json", "--engine", "npx spectral",
        ])
        .unwrap();
        match cli.cmd {
            Some(Commands::Test { args }) => {
                assert_eq!(args.dir.as_deref(), Some("rules"));
                assert_eq!(args.output.as_deref(), Some("json"));
                assert_eq!(args.engine.as_deref(), Some("npx spectral"));
            }
            _ => panic!("expected test subcommand"),
        }
    }

    #[test]
    fn test_merge_subcommand() {
        let cli = Cli::try_parse_from(["specter", "merge", "rules", "--target", "out.yaml"]).unwrap();
        assert!(matches!(cli.cmd, Some(Commands::Merge { .. })));
    }
}
