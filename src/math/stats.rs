//! Descriptive statistics.
//!
//! Conventions used throughout the project:
//!
//! - standard deviation is the *sample* deviation (divisor `n - 1`); a
//!   single-observation group has no deviation and yields `None`, never zero
//! - the percentile rank of a value is the fraction of values strictly below
//!   it — ties do not count, so the rank of the minimum is 0%

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divisor `n - 1`).
///
/// Returns `None` when fewer than two observations are available.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Percentage of `values` strictly less than `target`.
///
/// `NaN` for an empty slice; ties with `target` are excluded from the count.
pub fn percentile_rank_strict(values: &[f64], target: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let below = values.iter().filter(|v| **v < target).count();
    below as f64 / values.len() as f64 * 100.0
}
