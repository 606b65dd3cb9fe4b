//! Render the run summary and risk tables for the terminal.

use crate::domain::WeeklyIndex;
use crate::risk::RiskSummary;
use crate::transform::CleanReport;

/// Format the run summary: cleaning counts plus the key metrics block.
pub fn format_run_summary(
    clean_report: &CleanReport,
    weekly: &WeeklyIndex,
    risk: &RiskSummary,
) -> String {
    let mut out = String::new();

    out.push_str("=== wwcm - Winter Wheat Condition Monitor ===\n");
    out.push_str(&format!(
        "Rows: {} -> {} (duplicates: {}, incomplete weeks: {})\n",
        clean_report.rows_before,
        clean_report.rows_after,
        clean_report.duplicates,
        clean_report.dropped_weeks,
    ));
    if !clean_report.empty_columns.is_empty() {
        out.push_str(&format!(
            "Null columns dropped: {}\n",
            clean_report.empty_columns.join(", ")
        ));
    }
    if let (Some(first), Some(last)) = (weekly.first(), weekly.last()) {
        out.push_str(&format!(
            "Weeks: n={} | span {} .. {}\n",
            weekly.len(),
            first.week_ending,
            last.week_ending,
        ));
    }

    let d = &risk.descriptive;
    out.push_str("\nMetrics (index: 100 = very poor, 500 = excellent):\n");
    out.push_str(&format!("- mean            : {:>7.1}\n", d.mean));
    out.push_str(&format!("- std deviation   : {:>7}\n", fmt_opt(d.std_dev)));
    out.push_str(&format!("- min / max       : {:>7.1} / {:.1}\n", d.min, d.max));
    out.push_str(&format!("- last value      : {:>7.1}\n", d.last));
    out.push_str(&format!(
        "- last vs mean    : {:>+7.1}%\n",
        d.relative_deviation_pct
    ));
    out.push_str(&format!(
        "- last percentile : {:>7.0}%\n",
        d.last_percentile
    ));

    out
}

/// Format the per-crop-year risk table and the seasonal stress calendar.
pub fn format_risk_tables(risk: &RiskSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Crop years (stress threshold {:.0}):\n",
        risk.stress_threshold
    ));
    out.push_str(&format!(
        "{:<10} {:>8} {:>8} {:>8} {:>6} {:>10}\n",
        "crop_year", "mean", "min", "vol", "risk", "intensity"
    ));
    out.push_str(&format!(
        "{:-<10} {:-<8} {:-<8} {:-<8} {:-<6} {:-<10}\n",
        "", "", "", "", "", ""
    ));
    for (year, mean) in &risk.annual_mean {
        let min = risk.annual_min.get(year).copied().unwrap_or(f64::NAN);
        let vol = risk.annual_volatility.get(year).copied().flatten();
        let flagged = risk.risk_flags.get(year).copied().unwrap_or(false);
        let intensity = risk.stress_intensity.get(year);
        out.push_str(&format!(
            "{:<10} {:>8.1} {:>8.1} {:>8} {:>6} {:>10}\n",
            year,
            mean,
            min,
            fmt_opt(vol),
            if flagged { "yes" } else { "no" },
            intensity.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string()),
        ));
    }

    out.push_str(&format!(
        "\nHistorical risk: {:.1}% of crop years at risk, {:.1}% normal\n",
        risk.risk_proportion.at_risk_pct, risk.risk_proportion.normal_pct
    ));

    let stressed: Vec<(u32, f64)> = risk
        .seasonal_stress
        .iter()
        .filter(|(_, p)| **p > 0.0)
        .map(|(w, p)| (*w, *p))
        .collect();
    if !stressed.is_empty() {
        out.push_str("\nSeasonal stress calendar (ISO week, P(index < threshold)):\n");
        for (week, prob) in stressed {
            out.push_str(&format!("- week {week:>2} : {:>5.1}%\n", prob * 100.0));
        }
    }

    out
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1}"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{WeeklyIndex, WeeklyPoint};
    use crate::risk::analyze;
    use crate::transform::project_matrix;
    use chrono::NaiveDate;

    fn sample() -> (CleanReport, WeeklyIndex, RiskSummary) {
        let weekly = WeeklyIndex::from_sorted(vec![
            WeeklyPoint {
                week_ending: NaiveDate::from_ymd_opt(2023, 10, 7).unwrap(),
                index_value: 280.0,
            },
            WeeklyPoint {
                week_ending: NaiveDate::from_ymd_opt(2023, 10, 14).unwrap(),
                index_value: 310.0,
            },
        ]);
        let matrix = project_matrix(&weekly);
        let risk = analyze(&weekly, &matrix, 300.0).unwrap();
        let report = CleanReport {
            rows_before: 12,
            rows_after: 10,
            duplicates: 2,
            empty_columns: vec!["year"],
            dropped_weeks: 0,
        };
        (report, weekly, risk)
    }

    #[test]
    fn summary_mentions_counts_and_metrics() {
        let (report, weekly, risk) = sample();
        let text = format_run_summary(&report, &weekly, &risk);
        assert!(text.contains("Rows: 12 -> 10"));
        assert!(text.contains("Null columns dropped: year"));
        assert!(text.contains("span 2023-10-07 .. 2023-10-14"));
        assert!(text.contains("mean"));
    }

    #[test]
    fn tables_mark_missing_volatility_as_dash() {
        let (_, weekly, _) = sample();
        // Single-week crop year: volatility must render as "-".
        let single = WeeklyIndex::from_sorted(vec![weekly.points()[0]]);
        let matrix = project_matrix(&single);
        let risk = analyze(&single, &matrix, 300.0).unwrap();
        let text = format_risk_tables(&risk);
        assert!(text.contains(" - "), "table: {text}");
        assert!(text.contains("100.0% of crop years at risk"));
    }
}
