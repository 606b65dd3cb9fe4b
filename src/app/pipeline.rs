//! Shared pipeline logic used by both the online and offline front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch -> clean -> index -> project -> analyze
//!
//! `run` and `analyze` then focus on where the raw rows come from and how the
//! outputs are presented (terminal report, exports, chart).

use tracing::info;

use crate::data::QuickStatsClient;
use crate::domain::{CleanedObservation, CropYearMatrix, RawObservation, RunConfig, WeeklyIndex};
use crate::error::AppError;
use crate::risk::{self, RiskSummary, TrendStats};
use crate::transform::{self, CleanReport};

/// All computed outputs of a single pipeline run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub cleaned: Vec<CleanedObservation>,
    pub clean_report: CleanReport,
    pub weekly: WeeklyIndex,
    pub matrix: CropYearMatrix,
    pub risk: RiskSummary,
    pub trends: TrendStats,
}

/// Fetch survey rows for the configured year range.
pub fn fetch_observations(
    config: &RunConfig,
    api_key: Option<&str>,
) -> Result<Vec<RawObservation>, AppError> {
    info!("extracting survey data ({}..={})", config.start_year, config.end_year);
    let client = match api_key {
        Some(key) => QuickStatsClient::new(config.api_url.as_str(), key),
        None => QuickStatsClient::from_env(config.api_url.as_str())?,
    };
    client.fetch_range(&config.query, config.start_year, config.end_year)
}

/// Execute the transformation and analysis stages on pre-fetched rows.
///
/// This is the whole in-scope pipeline: each stage consumes the previous
/// stage's immutable output, and the statistics never touch the network or
/// the filesystem.
pub fn transform_observations(
    config: &RunConfig,
    raw: Vec<RawObservation>,
) -> Result<RunOutput, AppError> {
    info!("cleaning {} raw rows", raw.len());
    let (cleaned, clean_report) = transform::clean(raw);

    info!("computing condition index");
    let indexed = transform::build_index(&cleaned)?;

    info!("projecting series");
    let weekly = transform::project_simple(&indexed);
    let matrix = transform::project_matrix(&weekly);

    info!("analyzing risk (threshold {})", config.stress_threshold);
    let risk = risk::analyze(&weekly, &matrix, config.stress_threshold)?;
    let trends = risk::trends(&weekly, config.rolling_window);

    Ok(RunOutput {
        cleaned,
        clean_report,
        weekly,
        matrix,
        risk,
        trends,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn config() -> RunConfig {
        RunConfig {
            api_url: String::new(),
            query: BTreeMap::new(),
            start_year: 2023,
            end_year: 2024,
            stress_threshold: 300.0,
            rolling_window: 10,
            out_dir: PathBuf::from("data"),
            export: false,
            plot: false,
            plot_width: 100,
            plot_height: 25,
        }
    }

    fn week(date: &str, values: [f64; 5]) -> Vec<RawObservation> {
        let labels = [
            "PCT VERY POOR",
            "PCT POOR",
            "PCT FAIR",
            "PCT GOOD",
            "PCT EXCELLENT",
        ];
        let week_ending = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        labels
            .iter()
            .zip(values)
            .map(|(label, value)| RawObservation {
                report_timestamp: NaiveDateTime::parse_from_str(
                    "2024-01-08 12:00:00",
                    "%Y-%m-%d %H:%M:%S",
                )
                .unwrap(),
                week_ending,
                category: label.to_string(),
                value,
                state: Some("SOUTH DAKOTA".to_string()),
                commodity: Some("WHEAT".to_string()),
                year: None,
            })
            .collect()
    }

    #[test]
    fn end_to_end_transform() {
        // One complete week (index 360), one partial week (dropped), one
        // stressed week across the crop-year boundary.
        let mut raw = week("2024-01-06", [10.0, 10.0, 20.0, 30.0, 30.0]);
        raw.extend(week("2024-01-13", [10.0, 10.0, 20.0, 30.0, 28.0]));
        raw.extend(week("2023-09-28", [40.0, 30.0, 20.0, 10.0, 0.0]));

        let out = transform_observations(&config(), raw).unwrap();

        assert_eq!(out.clean_report.dropped_weeks, 1);
        assert_eq!(out.weekly.len(), 2);

        let jan6 = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let point = out
            .weekly
            .points()
            .iter()
            .find(|p| p.week_ending == jan6)
            .unwrap();
        assert!((point.index_value - 360.0).abs() < 1e-12);
        assert!(!out
            .weekly
            .points()
            .iter()
            .any(|p| p.week_ending == NaiveDate::from_ymd_opt(2024, 1, 13).unwrap()));

        // 2023-09-28 belongs to crop year 2023; 2024-01-06 to crop year 2024.
        assert_eq!(out.matrix.crop_years().collect::<Vec<_>>(), vec![2023, 2024]);
        // 1*40 + 2*30 + 3*20 + 4*10 = 200, stressed.
        assert_eq!(out.risk.risk_flags.get(&2023), Some(&true));
        assert_eq!(out.risk.risk_flags.get(&2024), Some(&false));
        assert!((out.risk.stress_intensity.get(&2023).unwrap() - 100.0).abs() < 1e-12);

        for value in out.weekly.values() {
            assert!((100.0..=500.0).contains(&value));
        }
    }

    #[test]
    fn unknown_category_aborts_the_run() {
        let mut raw = week("2024-01-06", [10.0, 10.0, 20.0, 30.0, 30.0]);
        raw[0].category = "PCT MYSTERY".to_string();

        let err = transform_observations(&config(), raw).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("PCT MYSTERY"));
    }
}
