//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments
//! - fetches survey data (or reads a previously exported raw CSV)
//! - runs cleaning, indexing, projection, and risk analysis
//! - writes exports and prints the report/chart

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use tracing::info;

use crate::cli::{AnalyzeArgs, Command, RunArgs};
use crate::config::{load_params, RunParams};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `wwcm` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // We want `wwcm` and `wwcm --start-year 2015` to behave like `wwcm run ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Analyze(args) => handle_analyze(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let params = load_params(args.config.as_deref())?;
    let config = run_config(&params, &args);

    info!("running ETL & analytics pipeline");
    let raw = pipeline::fetch_observations(&config, args.api_key.as_deref())?;

    if config.export {
        std::fs::create_dir_all(&config.out_dir).map_err(|e| {
            AppError::new(2, format!("Failed to create '{}': {e}", config.out_dir.display()))
        })?;
        let path = stamped_path(&config.out_dir, "wwc_raw_data", "csv");
        crate::io::write_raw_csv(&path, &raw)?;
        info!("raw data written to {}", path.display());
    }

    let output = pipeline::transform_observations(&config, raw)?;
    finish(&config, &output)
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analyze_config(&args);

    info!("re-analyzing {}", args.input.display());
    let raw = crate::data::read_survey_csv(&args.input)?;
    let output = pipeline::transform_observations(&config, raw)?;
    finish(&config, &output)
}

/// Shared tail of both subcommands: exports, report, chart.
fn finish(config: &RunConfig, output: &pipeline::RunOutput) -> Result<(), AppError> {
    if config.export {
        std::fs::create_dir_all(&config.out_dir).map_err(|e| {
            AppError::new(2, format!("Failed to create '{}': {e}", config.out_dir.display()))
        })?;

        crate::io::write_cleaned_csv(
            &stamped_path(&config.out_dir, "wwc_cleaned_data", "csv"),
            &output.cleaned,
        )?;
        crate::io::write_weekly_csv(
            &stamped_path(&config.out_dir, "wwc_weekly_index", "csv"),
            &output.weekly,
        )?;
        crate::io::write_matrix_csv(
            &stamped_path(&config.out_dir, "wwc_crop_matrix", "csv"),
            &output.matrix,
        )?;
        crate::io::write_risk_json(
            &stamped_path(&config.out_dir, "wwc_risk_summary", "json"),
            &output.risk,
            &output.trends,
        )?;
        info!("exports written to {}", config.out_dir.display());
    }

    println!(
        "{}",
        crate::report::format_run_summary(&output.clean_report, &output.weekly, &output.risk)
    );
    println!("{}", crate::report::format_risk_tables(&output.risk));

    if config.plot {
        let chart = crate::plot::render_weekly_ascii(
            &output.weekly,
            output.risk.stress_threshold,
            config.plot_width,
            config.plot_height,
        );
        println!("{chart}");
    }

    Ok(())
}

fn run_config(params: &RunParams, args: &RunArgs) -> RunConfig {
    let a = &args.analysis;
    RunConfig {
        api_url: params.qs_url.clone(),
        query: params.query.clone(),
        start_year: args.start_year.unwrap_or(params.start_year),
        end_year: args.end_year.unwrap_or(params.end_year),
        stress_threshold: a.stress_threshold,
        rolling_window: a.rolling_window,
        out_dir: a.out_dir.clone(),
        export: !a.no_export,
        plot: !a.no_plot,
        plot_width: a.width,
        plot_height: a.height,
    }
}

fn analyze_config(args: &AnalyzeArgs) -> RunConfig {
    let params = RunParams::default();
    run_config(
        &params,
        &RunArgs {
            api_key: None,
            config: None,
            start_year: None,
            end_year: None,
            analysis: args.analysis.clone(),
        },
    )
}

fn stamped_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    dir.join(format!("{stem}_{}.{ext}", Local::now().format("%d%m%Y")))
}

/// Rewrite argv so `wwcm` defaults to `wwcm run`.
///
/// Rules:
/// - `wwcm`                        -> `wwcm run`
/// - `wwcm --start-year 2015 ...`  -> `wwcm run --start-year 2015 ...`
/// - `wwcm --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "analyze");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_run() {
        assert_eq!(rewrite_args(argv(&["wwcm"])), argv(&["wwcm", "run"]));
        assert_eq!(
            rewrite_args(argv(&["wwcm", "--start-year", "2015"])),
            argv(&["wwcm", "run", "--start-year", "2015"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["wwcm", "analyze", "raw.csv"])),
            argv(&["wwcm", "analyze", "raw.csv"])
        );
        assert_eq!(rewrite_args(argv(&["wwcm", "--help"])), argv(&["wwcm", "--help"]));
    }
}
