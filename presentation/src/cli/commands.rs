//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for review results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full markdown report
    Full,
    /// Gate, disagreement and verdict counts only
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for codequorum_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => codequorum_domain::OutputFormat::Full,
            OutputFormat::Summary => codequorum_domain::OutputFormat::Summary,
            OutputFormat::Json => codequorum_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for codequorum
#[derive(Parser, Debug)]
#[command(name = "codequorum")]
#[command(author, version, about = "Multi-model code review with structured verdicts")]
#[command(arg_required_else_help = true)]
#[command(long_about = r#"
codequorum asks several AI models to review the same diff and compares
their verdicts.

Every model answers with a PASS / CONCERN / BLOCK verdict per change. The
overall gate is the worst verdict any model reports, and changes on which
models disagree are listed first.

Configuration files are loaded from (in priority order):
1. --config <path>                        Explicit config file
2. ./codequorum.toml or ./.codequorum.toml  Project-level config
3. ~/.config/codequorum/config.toml       Global config

Example:
  codequorum review                      Review staged changes
  codequorum review -b feature/x -s docs/spec.md
  codequorum gate -m claude -m gemini    Exit 0/1/2 for PASS/CONCERN/BLOCK
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long, global = true)]
    pub show_config: bool,

    /// Write the diagnostic log to a file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run code review with multiple models
    Review {
        #[command(flatten)]
        target: TargetArgs,

        /// Path to spec file for compliance checking
        #[arg(short, long, value_name = "PATH")]
        spec: Option<PathBuf>,

        /// Output format (default: full, or [output].format)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Run review and exit with 0 (PASS), 1 (CONCERN) or 2 (BLOCK)
    Gate {
        #[command(flatten)]
        target: TargetArgs,

        /// Path to spec file for compliance checking
        #[arg(short, long, value_name = "PATH")]
        spec: Option<PathBuf>,
    },

    /// Show only disagreements between models
    Compare {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Check code changes against a specification file
    #[command(name = "check-spec")]
    CheckSpec {
        /// Specification file to check against
        spec: PathBuf,

        /// Branch to check (default: staged changes)
        #[arg(short, long)]
        branch: Option<String>,

        /// Base branch to diff against
        #[arg(long)]
        base: Option<String>,

        /// Model to use
        #[arg(short, long, default_value = "claude")]
        model: String,
    },

    /// List configured models and whether their CLI is installed
    Models,
}

/// Which changes to review and with which models
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Branch to review (default: staged changes)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Base branch to diff against (default: origin/main or main)
    #[arg(long)]
    pub base: Option<String>,

    /// Models to use (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Repository root observation tools run against (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub repo: Option<PathBuf>,

    /// Maximum observation rounds per model (0 disables observations)
    #[arg(long, value_name = "N")]
    pub max_observations: Option<usize>,
}
