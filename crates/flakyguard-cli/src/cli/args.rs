use clap::{Parser, Subcommand, ValueEnum};
use flakyguard_core::config::DEFAULT_DB_PATH;
use flakyguard_core::ingest::DEFAULT_PATTERN;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "flakyguard",
    version,
    about = "Detect, quarantine & cost-attribute flaky tests from JUnit history"
)]
pub struct Cli {
    /// SQLite result store
    #[arg(long, global = true, env = "FLAKYGUARD_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Optional YAML config with detection, cost and classifier defaults
    #[arg(long, global = true, env = "FLAKYGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest JUnit XML results: a single file or a directory (batch)
    Ingest(IngestArgs),
    /// Detect flaky tests by flip-rate analysis
    Detect(DetectArgs),
    /// Print a conftest.py that skips quarantined flaky tests
    Quarantine(QuarantineArgs),
    /// Failure-rate trends over a time window
    Trends(TrendsArgs),
    /// Show ingestion statistics
    Stats,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(clap::Args, Clone, Debug)]
pub struct IngestArgs {
    /// Report file, or directory to scan recursively
    pub path: PathBuf,

    /// Custom run identifier (single file mode)
    #[arg(long)]
    pub run_id: Option<String>,

    /// Glob for report files relative to the directory (batch mode)
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct SelectionArgs {
    /// Minimum runs before a test is evaluated
    #[arg(long)]
    pub min_runs: Option<u64>,

    /// Flip rate threshold (0.0-1.0)
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(clap::Args, Clone, Debug)]
pub struct DetectArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// CI cost per minute in USD
    #[arg(long)]
    pub ci_cost: Option<f64>,

    /// Average rerun duration in minutes
    #[arg(long)]
    pub rerun_min: Option<f64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(clap::Args, Clone, Debug)]
pub struct QuarantineArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Write the artifact to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Debug)]
pub struct TrendsArgs {
    /// Analysis window in days
    #[arg(long, default_value_t = 30)]
    pub days: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}
