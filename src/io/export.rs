//! Export pipeline outputs to CSV/JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! dashboards. Every CSV field is quoted, matching the original extract
//! format, and the raw export round-trips through `data::parse_survey_csv`.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{CleanedObservation, CropYearMatrix, RawObservation, WeeklyIndex};
use crate::error::AppError;
use crate::risk::{RiskSummary, TrendStats};

fn csv_writer(path: &Path) -> Result<csv::Writer<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
    Ok(csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(file))
}

fn write_failed(path: &Path, e: impl std::fmt::Display) -> AppError {
    AppError::new(2, format!("Failed to write '{}': {e}", path.display()))
}

/// Write raw survey rows in the QuickStats CSV schema.
pub fn write_raw_csv(path: &Path, rows: &[RawObservation]) -> Result<(), AppError> {
    let mut w = csv_writer(path)?;
    w.write_record([
        "load_time",
        "week_ending",
        "unit_desc",
        "Value",
        "state_name",
        "commodity_desc",
        "year",
    ])
    .map_err(|e| write_failed(path, e))?;

    for r in rows {
        w.write_record([
            r.report_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.week_ending.to_string(),
            r.category.clone(),
            format_value(r.value),
            r.state.clone().unwrap_or_default(),
            r.commodity.clone().unwrap_or_default(),
            r.year.map(|y| y.to_string()).unwrap_or_default(),
        ])
        .map_err(|e| write_failed(path, e))?;
    }
    w.flush().map_err(|e| write_failed(path, e))
}

/// Write the cleaned table: exactly the four downstream fields, one row per
/// (week_ending, category).
pub fn write_cleaned_csv(path: &Path, rows: &[CleanedObservation]) -> Result<(), AppError> {
    let mut w = csv_writer(path)?;
    w.write_record(["load_time", "week_ending", "unit_desc", "Value"])
        .map_err(|e| write_failed(path, e))?;

    for r in rows {
        w.write_record([
            r.report_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.week_ending.to_string(),
            r.category.clone(),
            format_value(r.value),
        ])
        .map_err(|e| write_failed(path, e))?;
    }
    w.flush().map_err(|e| write_failed(path, e))
}

/// Write the weekly index series as ordered (date, scalar) pairs.
pub fn write_weekly_csv(path: &Path, weekly: &WeeklyIndex) -> Result<(), AppError> {
    let mut w = csv_writer(path)?;
    w.write_record(["week_ending", "index_value"])
        .map_err(|e| write_failed(path, e))?;

    for p in weekly.points() {
        w.write_record([p.week_ending.to_string(), format_value(p.index_value)])
            .map_err(|e| write_failed(path, e))?;
    }
    w.flush().map_err(|e| write_failed(path, e))
}

/// Write the sparse crop-year matrix as (week_in_crop, crop_year, value)
/// triplets. Absent weeks produce no row — missing, not zero.
pub fn write_matrix_csv(path: &Path, matrix: &CropYearMatrix) -> Result<(), AppError> {
    let mut w = csv_writer(path)?;
    w.write_record(["week_in_crop", "crop_year", "index_value"])
        .map_err(|e| write_failed(path, e))?;

    for (week_in_crop, crop_year, value) in matrix.cells() {
        w.write_record([
            week_in_crop.to_string(),
            crop_year.to_string(),
            format_value(value),
        ])
        .map_err(|e| write_failed(path, e))?;
    }
    w.flush().map_err(|e| write_failed(path, e))
}

#[derive(Serialize)]
struct AnalyticsBundle<'a> {
    risk: &'a RiskSummary,
    trends: &'a TrendStats,
}

/// Write the full analytics bundle as pretty JSON.
pub fn write_risk_json(
    path: &Path,
    risk: &RiskSummary,
    trends: &TrendStats,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &AnalyticsBundle { risk, trends })
        .map_err(|e| write_failed(path, e))
}

/// Trim a trailing `.0` so whole percentages print the way the survey does.
fn format_value(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v}")
    }
}
