//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the transformation stages
//! - exported to CSV/JSON
//! - reloaded later for offline re-analysis
//!
//! Every stage output is an immutable value object: a stage consumes its input
//! by reference (or by value, once) and returns a new structure. Nothing is
//! mutated in place after creation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// First month of the *next* crop year for winter wheat.
///
/// The growing season straddles the calendar-year boundary: weeks from October
/// through the following September belong to the next calendar year's label.
/// Seedings in October are harvested the following summer, so grouping by crop
/// year rather than calendar year is what makes year-over-year comparison
/// meaningful.
pub const CROP_YEAR_START_MONTH: u32 = 10;

/// Crop-year label for a surveyed week.
pub fn crop_year_of(week_ending: NaiveDate) -> i32 {
    let mut year = week_ending.year();
    if week_ending.month() >= CROP_YEAR_START_MONTH {
        year += 1;
    }
    year
}

/// One of the five mutually exclusive condition categories.
///
/// The survey reports, per week, the percentage of the crop in each category.
/// Categories map to ordinal weights 1..=5 (worst to best); the weighted sum
/// over a full week is the composite condition index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    VeryPoor,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::VeryPoor,
        Category::Poor,
        Category::Fair,
        Category::Good,
        Category::Excellent,
    ];

    /// Parse a QuickStats `unit_desc` label.
    ///
    /// Returns `None` for anything outside the five known labels; callers must
    /// treat that as a data-integrity failure, not as weight zero.
    pub fn from_label(label: &str) -> Option<Category> {
        match label.trim() {
            "PCT VERY POOR" => Some(Category::VeryPoor),
            "PCT POOR" => Some(Category::Poor),
            "PCT FAIR" => Some(Category::Fair),
            "PCT GOOD" => Some(Category::Good),
            "PCT EXCELLENT" => Some(Category::Excellent),
            _ => None,
        }
    }

    /// The survey label as published by QuickStats.
    pub fn label(self) -> &'static str {
        match self {
            Category::VeryPoor => "PCT VERY POOR",
            Category::Poor => "PCT POOR",
            Category::Fair => "PCT FAIR",
            Category::Good => "PCT GOOD",
            Category::Excellent => "PCT EXCELLENT",
        }
    }

    /// Ordinal weight, 1 (very poor) to 5 (excellent).
    pub fn weight(self) -> u8 {
        match self {
            Category::VeryPoor => 1,
            Category::Poor => 2,
            Category::Fair => 3,
            Category::Good => 4,
            Category::Excellent => 5,
        }
    }
}

/// One reported survey row, as handed over by the retrieval collaborator.
///
/// Core fields are fully typed; the optional descriptive fields exist only so
/// the Cleaner can report schema drift (a column that is null for every row).
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    /// When the observation was published (`load_time`).
    pub report_timestamp: NaiveDateTime,
    /// End date of the surveyed week.
    pub week_ending: NaiveDate,
    /// Raw category label (`unit_desc`); validated later by the IndexBuilder.
    pub category: String,
    /// Percentage of the crop in this category, 0..=100.
    pub value: f64,

    pub state: Option<String>,
    pub commodity: Option<String>,
    pub year: Option<i32>,
}

impl RawObservation {
    /// Owned key for exact-duplicate detection (all fields equal).
    ///
    /// `f64` is not `Hash`, so the value participates via its bit pattern.
    pub(crate) fn dedup_key(&self) -> DedupKey {
        (
            self.report_timestamp,
            self.week_ending,
            self.category.clone(),
            self.value.to_bits(),
            self.state.clone(),
            self.commodity.clone(),
            self.year,
        )
    }
}

pub(crate) type DedupKey = (
    NaiveDateTime,
    NaiveDate,
    String,
    u64,
    Option<String>,
    Option<String>,
    Option<i32>,
);

/// A raw observation restricted to the four fields needed downstream,
/// guaranteed to belong to a week whose five category values sum to 100
/// (within 0.1, one-decimal rounding).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedObservation {
    pub report_timestamp: NaiveDateTime,
    pub week_ending: NaiveDate,
    pub category: String,
    pub value: f64,
}

/// A cleaned observation with its validated category weight applied.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedObservation {
    pub report_timestamp: NaiveDateTime,
    pub week_ending: NaiveDate,
    pub category: Category,
    pub value: f64,
    /// Ordinal weight 1..=5 from the category map.
    pub weight: u8,
    /// `weight * value`; summing these per week yields the composite index.
    pub weighted_value: f64,
}

/// One point of the simple chronological series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    pub week_ending: NaiveDate,
    /// Composite condition index, in [100, 500] for a complete week.
    pub index_value: f64,
}

/// The composite index as a date-ordered series with unique week-ending keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WeeklyIndex {
    points: Vec<WeeklyPoint>,
}

impl WeeklyIndex {
    /// Build from points already sorted ascending by `week_ending` with unique
    /// dates. The projector is the only producer.
    pub(crate) fn from_sorted(points: Vec<WeeklyPoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].week_ending < w[1].week_ending));
        Self { points }
    }

    pub fn points(&self) -> &[WeeklyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.index_value)
    }

    pub fn first(&self) -> Option<&WeeklyPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&WeeklyPoint> {
        self.points.last()
    }
}

/// The weekly index pivoted into a sparse crop-year × week-position table.
///
/// Each column holds one crop year's observed weeks in date order; the
/// position within the column *is* `week_in_crop - 1`, so week positions are
/// contiguous `1..=k` by construction. Absent weeks (winter dormancy) simply
/// produce no entry — missing, never zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CropYearMatrix {
    columns: BTreeMap<i32, Vec<f64>>,
}

impl CropYearMatrix {
    pub(crate) fn from_columns(columns: BTreeMap<i32, Vec<f64>>) -> Self {
        Self { columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn crop_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.columns.keys().copied()
    }

    pub fn column(&self, crop_year: i32) -> Option<&[f64]> {
        self.columns.get(&crop_year).map(|c| c.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (i32, &[f64])> + '_ {
        self.columns.iter().map(|(y, c)| (*y, c.as_slice()))
    }

    /// Sparse cells as `(week_in_crop, crop_year, index_value)` triplets.
    pub fn cells(&self) -> impl Iterator<Item = (u32, i32, f64)> + '_ {
        self.columns.iter().flat_map(|(year, col)| {
            col.iter()
                .enumerate()
                .map(move |(i, v)| (i as u32 + 1, *year, *v))
        })
    }

    /// Length of the longest column (for renderers that need a grid height).
    pub fn max_weeks(&self) -> usize {
        self.columns.values().map(Vec::len).max().unwrap_or(0)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags plus the optional `params.json`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_url: String,
    /// Fixed QuickStats query parameters (commodity, state, etc.).
    pub query: BTreeMap<String, String>,
    pub start_year: i32,
    pub end_year: i32,

    /// Index level below which a week counts as agriculturally stressed.
    pub stress_threshold: f64,
    /// Window (points) for the rolling annual trend statistics.
    pub rolling_window: usize,

    pub out_dir: PathBuf,
    pub export: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_weights_are_ordered_one_to_five() {
        let weights: Vec<u8> = Category::ALL.iter().map(|c| c.weight()).collect();
        assert_eq!(weights, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn category_labels_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_label(cat.label()), Some(cat));
        }
        assert_eq!(Category::from_label("PCT PLANTED"), None);
        assert_eq!(Category::from_label(" PCT GOOD "), Some(Category::Good));
    }

    #[test]
    fn crop_year_cutover_is_october_first() {
        let sep30 = NaiveDate::from_ymd_opt(2023, 9, 30).unwrap();
        let oct1 = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
        assert_eq!(crop_year_of(sep30), 2023);
        assert_eq!(crop_year_of(oct1), 2024);
    }

    #[test]
    fn matrix_cells_are_one_based_and_contiguous() {
        let mut columns = BTreeMap::new();
        columns.insert(2023, vec![310.0, 290.0]);
        columns.insert(2024, vec![355.0]);
        let matrix = CropYearMatrix::from_columns(columns);

        let cells: Vec<(u32, i32, f64)> = matrix.cells().collect();
        assert_eq!(
            cells,
            vec![(1, 2023, 310.0), (2, 2023, 290.0), (1, 2024, 355.0)]
        );
        assert_eq!(matrix.max_weeks(), 2);
    }
}
