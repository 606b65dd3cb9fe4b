//! RiskAnalyzer: descriptive, rolling, and stress-threshold statistics.
//!
//! Every function here is a stateless, idempotent aggregate of its inputs;
//! nothing carries independent lifecycle and nothing mutates the series or
//! the matrix. The summary is recomputed on each analysis run.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::domain::{CropYearMatrix, WeeklyIndex};
use crate::error::AppError;
use crate::math::{mean, percentile_rank_strict, rolling_mean, rolling_min, sample_std};

/// Index level below which conditions are considered agriculturally stressed.
pub const DEFAULT_STRESS_THRESHOLD: f64 = 300.0;

/// Window used for the annual rolling trend statistics.
pub const DEFAULT_ROLLING_WINDOW: usize = 10;

/// Scalar statistics over the whole weekly series.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    pub mean: f64,
    /// Sample standard deviation; `None` for a single-week series.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub last: f64,
    /// Percentage of historical values strictly below the last value.
    /// Ties are not counted, so this is a strict-inequality rank.
    pub last_percentile: f64,
    /// Last value vs the historical mean, in percent.
    pub relative_deviation_pct: f64,
}

/// Share of crop years flagged at risk vs not, as percentages summing to 100.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RiskProportion {
    pub at_risk_pct: f64,
    pub normal_pct: f64,
}

/// The full bundle of risk statistics for dashboards.
///
/// Each field is independently consumable; the maps are keyed by crop year
/// except `seasonal_stress`, which deliberately uses the ISO calendar week
/// (1–53) to capture seasonal recurrence across crop-year boundaries.
#[derive(Debug, Clone, Serialize)]
pub struct RiskSummary {
    pub stress_threshold: f64,
    pub descriptive: DescriptiveStats,
    pub annual_mean: BTreeMap<i32, f64>,
    pub annual_min: BTreeMap<i32, f64>,
    /// Per-crop-year sample std of the weekly index; `None` for
    /// single-observation years (missing, never zero).
    pub annual_volatility: BTreeMap<i32, Option<f64>>,
    /// `true` when the year's minimum weekly index fell below the threshold.
    pub risk_flags: BTreeMap<i32, bool>,
    pub risk_proportion: RiskProportion,
    /// Fraction (0..1) of historical observations in each ISO calendar week
    /// with an index below the threshold.
    pub seasonal_stress: BTreeMap<u32, f64>,
    /// Σ (threshold − index) over stressed weeks, by crop year. Years with no
    /// stressed weeks are absent — only stressed years are shown.
    pub stress_intensity: BTreeMap<i32, f64>,
}

/// Annual/monthly trend series for the evolution panels.
#[derive(Debug, Clone, Serialize)]
pub struct TrendStats {
    pub window: usize,
    /// Calendar years in ascending order; parallel to the three vectors below.
    pub years: Vec<i32>,
    pub annual_mean: Vec<f64>,
    pub rolling_mean: Vec<Option<f64>>,
    pub rolling_min: Vec<Option<f64>>,
    /// Mean index per calendar month (1–12) across all years.
    pub monthly_mean: BTreeMap<u32, f64>,
}

/// Compute the risk summary over the weekly series and the crop-year matrix.
///
/// Errors only when the series is empty (nothing to analyze); every
/// degenerate-statistics condition inside a non-empty series is represented
/// as a missing value instead.
pub fn analyze(
    weekly: &WeeklyIndex,
    matrix: &CropYearMatrix,
    stress_threshold: f64,
) -> Result<RiskSummary, AppError> {
    if weekly.is_empty() {
        return Err(AppError::new(4, "Cannot analyze an empty weekly index series."));
    }

    let values: Vec<f64> = weekly.values().collect();
    let series_mean = mean(&values);
    let last = values[values.len() - 1];
    let descriptive = DescriptiveStats {
        mean: series_mean,
        std_dev: sample_std(&values),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        last,
        last_percentile: percentile_rank_strict(&values, last),
        relative_deviation_pct: (last / series_mean - 1.0) * 100.0,
    };

    let mut annual_mean = BTreeMap::new();
    let mut annual_min = BTreeMap::new();
    let mut annual_volatility = BTreeMap::new();
    let mut risk_flags = BTreeMap::new();
    let mut stress_intensity = BTreeMap::new();
    for (crop_year, column) in matrix.columns() {
        let year_min = column.iter().copied().fold(f64::INFINITY, f64::min);
        annual_mean.insert(crop_year, mean(column));
        annual_min.insert(crop_year, year_min);
        annual_volatility.insert(crop_year, sample_std(column));
        risk_flags.insert(crop_year, year_min < stress_threshold);

        if column.iter().any(|v| *v < stress_threshold) {
            let gap: f64 = column
                .iter()
                .filter(|v| **v < stress_threshold)
                .map(|v| stress_threshold - v)
                .sum();
            stress_intensity.insert(crop_year, gap);
        }
    }

    let n_years = risk_flags.len();
    let flagged = risk_flags.values().filter(|f| **f).count();
    let at_risk_pct = flagged as f64 / n_years as f64 * 100.0;
    let risk_proportion = RiskProportion {
        at_risk_pct,
        normal_pct: 100.0 - at_risk_pct,
    };

    let mut week_counts: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for point in weekly.points() {
        let week_no = point.week_ending.iso_week().week();
        let entry = week_counts.entry(week_no).or_insert((0, 0));
        entry.0 += 1;
        if point.index_value < stress_threshold {
            entry.1 += 1;
        }
    }
    let seasonal_stress = week_counts
        .into_iter()
        .map(|(week_no, (total, stressed))| (week_no, stressed as f64 / total as f64))
        .collect();

    Ok(RiskSummary {
        stress_threshold,
        descriptive,
        annual_mean,
        annual_min,
        annual_volatility,
        risk_flags,
        risk_proportion,
        seasonal_stress,
        stress_intensity,
    })
}

/// Annual evolution and seasonal profile of the weekly index.
///
/// Groups by *calendar* year (the dashboard's long-horizon axis), then applies
/// the explicit rolling aggregates with min-periods = window.
pub fn trends(weekly: &WeeklyIndex, window: usize) -> TrendStats {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for point in weekly.points() {
        by_year
            .entry(point.week_ending.year())
            .or_default()
            .push(point.index_value);
        by_month
            .entry(point.week_ending.month())
            .or_default()
            .push(point.index_value);
    }

    let years: Vec<i32> = by_year.keys().copied().collect();
    let annual_mean: Vec<f64> = by_year.values().map(|v| mean(v)).collect();

    TrendStats {
        window,
        rolling_mean: rolling_mean(&annual_mean, window),
        rolling_min: rolling_min(&annual_mean, window),
        years,
        annual_mean,
        monthly_mean: by_month
            .into_iter()
            .map(|(month, v)| (month, mean(&v)))
            .collect(),
    }
}
