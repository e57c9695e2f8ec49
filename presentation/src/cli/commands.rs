//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use navigator_domain::OutputFormat as DomainOutputFormat;
use std::path::PathBuf;

/// Console output format for evaluation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-model totals, recommendations and consensus
    Summary,
    /// The aggregate JSON document
    Json,
}

impl From<OutputFormat> for DomainOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Summary => DomainOutputFormat::Summary,
            OutputFormat::Json => DomainOutputFormat::Json,
        }
    }
}

/// CLI arguments for keyword-navigator
#[derive(Parser, Debug)]
#[command(name = "keyword-navigator")]
#[command(
    author,
    version,
    about = "Ask several LLMs which keyword-extraction profile navigates best"
)]
#[command(long_about = r#"
Keyword Navigator asks several models to act as navigators over the aggregate
keyword data of four extraction profiles (baseline, current, moderate,
aggressive) and scores how well each profile supports 18 search questions.

Each model answers the questions in chunks, then recommends one profile.
Recommendations are tallied into a cross-model consensus.

Configuration files are loaded from (in priority order):
1. --config <path>          Explicit config file
2. ./navigator.toml         Project-level config
3. ~/.config/keyword-navigator/config.toml   Global config

Example:
  keyword-navigator run
  keyword-navigator run -m gpt-5 -m claude-sonnet-4-5 --format json
  keyword-navigator retry --model gpt-5 --chunk 2
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostic logs to a daily file in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Evaluate every configured model and write the aggregate document
    Run(RunArgs),
    /// Re-run failed chunks of one model in an existing document
    Retry(RetryArgs),
}

/// Flags shared by `run` and `retry`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Aggregate evaluation document to write
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Console output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Append one JSON line per remote call to this file
    #[arg(long, value_name = "PATH")]
    pub call_log: Option<PathBuf>,

    /// Directory holding `<profile>.json` keyword summaries
    #[arg(long, value_name = "DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Minimum spacing between remote calls, in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Per-call timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Models to evaluate (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Questions per chunk
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Skip a model unless at least this many chunks succeed
    #[arg(long, value_name = "N")]
    pub min_chunks: Option<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RetryArgs {
    /// Model whose chunks should be re-run
    #[arg(short, long, value_name = "MODEL")]
    pub model: String,

    /// Chunk number to re-run (1-based; default: every failed chunk)
    #[arg(short, long = "chunk", value_name = "N")]
    pub chunks: Vec<usize>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl Cli {
    /// The subcommand to execute; a bare invocation runs the evaluation
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Run(RunArgs::default()))
    }
}

impl Command {
    pub fn output_args(&self) -> &OutputArgs {
        match self {
            Command::Run(args) => &args.output,
            Command::Retry(args) => &args.output,
        }
    }
}
