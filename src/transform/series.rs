//! SeriesProjector: aggregate indexed observations into the two projections.
//!
//! - `project_simple`: one scalar per calendar week, date-ordered
//! - `project_matrix`: the same scalars re-keyed by (week_in_crop, crop_year)
//!
//! Both are pure and idempotent: identical inputs yield bit-identical outputs.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{
    crop_year_of, CropYearMatrix, IndexedObservation, WeeklyIndex, WeeklyPoint,
};

/// Collapse the per-category rows of each week into one composite index.
///
/// For a complete week (values summing to 100, weights 1..=5) the result is a
/// percentage-weighted sum in [100, 500].
pub fn project_simple(indexed: &[IndexedObservation]) -> WeeklyIndex {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for obs in indexed {
        *sums.entry(obs.week_ending).or_insert(0.0) += obs.weighted_value;
    }
    WeeklyIndex::from_sorted(
        sums.into_iter()
            .map(|(week_ending, index_value)| WeeklyPoint {
                week_ending,
                index_value,
            })
            .collect(),
    )
}

/// Pivot the weekly series into the crop-year × week-position matrix.
///
/// `crop_year` is re-derived per week (October onward belongs to the next
/// crop year); `week_in_crop` is the 1-based ordinal of the week within its
/// crop year, ascending. Ties are impossible because `week_ending` is the
/// unique series key. Crop years with fewer observed weeks simply have
/// shorter columns.
pub fn project_matrix(weekly: &WeeklyIndex) -> CropYearMatrix {
    let mut columns: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for point in weekly.points() {
        columns
            .entry(crop_year_of(point.week_ending))
            .or_default()
            .push(point.index_value);
    }
    CropYearMatrix::from_columns(columns)
}
