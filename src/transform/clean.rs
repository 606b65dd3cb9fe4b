//! Cleaner: structural cleanup and incomplete-week filtering.
//!
//! Design goals:
//! - **Silent on data noise**: weeks whose category values do not sum to 100
//!   are expected upstream noise, dropped and counted, never an error
//! - **Loud on counts**: everything dropped is reported via `CleanReport` and
//!   logged, so dashboards can track data quality over time
//! - **No validation of category labels here** — that is the IndexBuilder's
//!   contract, where an unknown label is fatal

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::info;

use crate::domain::{CleanedObservation, RawObservation};

/// Observability counts emitted by the Cleaner. No effect on correctness.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates: usize,
    /// Optional columns that were null for every row (upstream schema drift);
    /// excluded from downstream consideration, not an error.
    pub empty_columns: Vec<&'static str>,
    /// Weeks dropped because their category values did not sum to 100 ± 0.1.
    pub dropped_weeks: usize,
}

/// Clean a batch of raw survey rows.
///
/// Drops exact-duplicate rows, sorts by publication time, and retains only
/// weeks whose five category values sum to exactly 100.0 after one-decimal
/// rounding. Partial weeks are dropped entirely — no partial weeks survive.
pub fn clean(raw: Vec<RawObservation>) -> (Vec<CleanedObservation>, CleanReport) {
    let rows_before = raw.len();
    let empty_columns = find_empty_columns(&raw);

    // Exact-duplicate removal, preserving first occurrence order.
    let mut seen = HashSet::with_capacity(raw.len());
    let mut rows: Vec<RawObservation> = Vec::with_capacity(raw.len());
    let mut duplicates = 0usize;
    for obs in raw {
        if seen.insert(obs.dedup_key()) {
            rows.push(obs);
        } else {
            duplicates += 1;
        }
    }

    // Order by publication time; grouping below is keyed by week_ending.
    rows.sort_by_key(|o| o.report_timestamp);

    let mut week_sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for obs in &rows {
        *week_sums.entry(obs.week_ending).or_insert(0.0) += obs.value;
    }
    let complete_weeks: BTreeSet<NaiveDate> = week_sums
        .iter()
        .filter(|(_, sum)| sums_to_hundred(**sum))
        .map(|(week, _)| *week)
        .collect();
    let dropped_weeks = week_sums.len() - complete_weeks.len();

    let cleaned: Vec<CleanedObservation> = rows
        .into_iter()
        .filter(|o| complete_weeks.contains(&o.week_ending))
        .map(|o| CleanedObservation {
            report_timestamp: o.report_timestamp,
            week_ending: o.week_ending,
            category: o.category,
            value: o.value,
        })
        .collect();

    let report = CleanReport {
        rows_before,
        rows_after: cleaned.len(),
        duplicates,
        empty_columns,
        dropped_weeks,
    };

    info!("rows before cleaning: {}", report.rows_before);
    if !report.empty_columns.is_empty() {
        info!("entirely null columns: {:?}", report.empty_columns);
    }
    info!("duplicate rows dropped: {}", report.duplicates);
    info!("incomplete weeks dropped: {}", report.dropped_weeks);
    info!("rows after cleaning: {}", report.rows_after);

    (cleaned, report)
}

/// A week is complete when its values sum to 100.0 after rounding to one
/// decimal (i.e. within 0.05 of 100).
fn sums_to_hundred(sum: f64) -> bool {
    (sum * 10.0).round() == 1000.0
}

fn find_empty_columns(rows: &[RawObservation]) -> Vec<&'static str> {
    let mut out = Vec::new();
    if rows.is_empty() {
        return out;
    }
    if rows.iter().all(|r| r.state.is_none()) {
        out.push("state_name");
    }
    if rows.iter().all(|r| r.commodity.is_none()) {
        out.push("commodity_desc");
    }
    if rows.iter().all(|r| r.year.is_none()) {
        out.push("year");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn obs(week: &str, category: &str, value: f64) -> RawObservation {
        let week_ending = NaiveDate::parse_from_str(week, "%Y-%m-%d").unwrap();
        RawObservation {
            report_timestamp: NaiveDateTime::parse_from_str(
                "2024-01-08 12:00:00",
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
            week_ending,
            category: category.to_string(),
            value,
            state: Some("SOUTH DAKOTA".to_string()),
            commodity: None,
            year: None,
        }
    }

    fn full_week(week: &str, values: [f64; 5]) -> Vec<RawObservation> {
        let labels = [
            "PCT VERY POOR",
            "PCT POOR",
            "PCT FAIR",
            "PCT GOOD",
            "PCT EXCELLENT",
        ];
        labels
            .iter()
            .zip(values)
            .map(|(label, v)| obs(week, label, v))
            .collect()
    }

    #[test]
    fn complete_weeks_are_retained() {
        let raw = full_week("2024-01-06", [10.0, 10.0, 20.0, 30.0, 30.0]);
        let (cleaned, report) = clean(raw);
        assert_eq!(cleaned.len(), 5);
        assert_eq!(report.dropped_weeks, 0);

        let sum: f64 = cleaned.iter().map(|o| o.value).sum();
        assert!((sum - 100.0).abs() <= 0.1);
    }

    #[test]
    fn partial_weeks_are_dropped_entirely() {
        // Sums to 98: the whole week disappears, silently.
        let mut raw = full_week("2024-01-06", [10.0, 10.0, 20.0, 30.0, 28.0]);
        raw.extend(full_week("2024-01-13", [5.0, 15.0, 25.0, 35.0, 20.0]));

        let (cleaned, report) = clean(raw);
        assert_eq!(report.dropped_weeks, 1);
        assert!(cleaned
            .iter()
            .all(|o| o.week_ending == NaiveDate::from_ymd_opt(2024, 1, 13).unwrap()));
    }

    #[test]
    fn rounding_tolerance_is_one_decimal() {
        // 99.96 rounds to 100.0 at one decimal; 99.9 does not.
        let near = full_week("2024-01-06", [10.0, 10.0, 20.0, 30.0, 29.96]);
        let (cleaned, _) = clean(near);
        assert_eq!(cleaned.len(), 5);

        let off = full_week("2024-01-13", [10.0, 10.0, 20.0, 30.0, 29.9]);
        let (cleaned, report) = clean(off);
        assert!(cleaned.is_empty());
        assert_eq!(report.dropped_weeks, 1);
    }

    #[test]
    fn exact_duplicates_are_dropped() {
        let mut raw = full_week("2024-01-06", [10.0, 10.0, 20.0, 30.0, 30.0]);
        raw.push(raw[0].clone());
        let (cleaned, report) = clean(raw);
        assert_eq!(report.duplicates, 1);
        assert_eq!(cleaned.len(), 5);
    }

    #[test]
    fn near_duplicates_survive() {
        // Same week and category but a different value is not a duplicate.
        // The week then sums to 110 and is dropped as incomplete instead.
        let mut raw = full_week("2024-01-06", [10.0, 10.0, 20.0, 30.0, 30.0]);
        let mut extra = raw[0].clone();
        extra.value = 10.0 + f64::EPSILON * 16.0;
        raw.push(extra);
        let (_, report) = clean(raw);
        assert_eq!(report.duplicates, 0);
    }

    #[test]
    fn entirely_null_columns_are_reported() {
        let raw = full_week("2024-01-06", [10.0, 10.0, 20.0, 30.0, 30.0]);
        let (_, report) = clean(raw);
        // `commodity` and `year` are None on every fixture row; `state` is not.
        assert_eq!(report.empty_columns, vec!["commodity_desc", "year"]);
    }
}
