//! Command-line parsing for the condition monitor.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the pipeline/statistics code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "wwcm",
    version,
    about = "Winter Wheat Condition Monitor (USDA QuickStats)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch survey data, run the pipeline, export tables, print the risk report.
    Run(RunArgs),
    /// Re-run the pipeline from a previously exported raw survey CSV (no network).
    Analyze(AnalyzeArgs),
}

/// Options shared by `run` and `analyze`.
#[derive(Debug, Parser, Clone)]
pub struct AnalysisArgs {
    /// Index level below which a week counts as agriculturally stressed.
    #[arg(long, default_value_t = 300.0)]
    pub stress_threshold: f64,

    /// Window (points) for the annual rolling trend statistics.
    #[arg(long, default_value_t = 10)]
    pub rolling_window: usize,

    /// Output directory for CSV/JSON exports.
    #[arg(long, default_value = "data")]
    pub out_dir: PathBuf,

    /// Skip writing exports.
    #[arg(long)]
    pub no_export: bool,

    /// Disable the terminal chart (enabled by default).
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for the full fetch-and-analyze run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// QuickStats API key (falls back to QUICKSTATS_API_KEY in the environment/.env).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Path to a params.json with API URL, query, and year-range overrides.
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Oldest year to fetch (overrides params.json).
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Most recent year to fetch (overrides params.json).
    #[arg(long)]
    pub end_year: Option<i32>,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Options for offline re-analysis.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Raw survey CSV produced by `wwcm run` (QuickStats CSV schema).
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}
