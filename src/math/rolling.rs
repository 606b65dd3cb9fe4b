//! Windowed aggregates over ordered sequences.
//!
//! Minimum-periods policy: an output position is defined only once a full
//! window of observations precedes it (inclusive). Earlier positions are
//! `None` — missing, not zero — so a 10-point rolling mean has nine leading
//! gaps.

/// Rolling mean over a trailing window of `window` points.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_apply(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Rolling minimum over a trailing window of `window` points.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_apply(values, window, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

fn rolling_apply(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                Some(f(&values[i + 1 - window..=i]))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_respects_min_periods() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let out = rolling_mean(&values, 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn rolling_min_tracks_trailing_window() {
        let values = [5.0, 3.0, 4.0, 6.0, 2.0];
        let out = rolling_min(&values, 2);
        assert_eq!(out, vec![None, Some(3.0), Some(3.0), Some(4.0), Some(2.0)]);
    }

    #[test]
    fn window_larger_than_series_yields_all_missing() {
        let out = rolling_mean(&[1.0, 2.0], 10);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn zero_window_yields_all_missing() {
        assert_eq!(rolling_mean(&[1.0], 0), vec![None]);
    }
}
