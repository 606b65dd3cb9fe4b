//! IndexBuilder: collapse the five categories into one composite index input.
//!
//! The composite index for a week is `Σ weight(category) * value`, with the
//! fixed map VERY POOR→1 … EXCELLENT→5. Note the sum is deliberately *not*
//! divided by 100: downstream bounds [100, 500] and the stress threshold are
//! calibrated to this scaling.

use crate::domain::{Category, CleanedObservation, IndexedObservation};
use crate::error::AppError;

/// Apply the category weight map to every cleaned observation.
///
/// An unknown category is a hard data-integrity failure: the Cleaner has
/// already validated the 100% sum per week, so silently dropping or zeroing a
/// row here would corrupt that invariant.
pub fn build_index(cleaned: &[CleanedObservation]) -> Result<Vec<IndexedObservation>, AppError> {
    let mut out = Vec::with_capacity(cleaned.len());
    for obs in cleaned {
        let category = Category::from_label(&obs.category).ok_or_else(|| {
            AppError::new(
                4,
                format!(
                    "Unknown condition category '{}' for week ending {}; \
                     expected one of the five PCT labels.",
                    obs.category, obs.week_ending
                ),
            )
        })?;
        let weight = category.weight();
        out.push(IndexedObservation {
            report_timestamp: obs.report_timestamp,
            week_ending: obs.week_ending,
            category,
            value: obs.value,
            weight,
            weighted_value: f64::from(weight) * obs.value,
        });
    }
    Ok(out)
}
