//! USDA QuickStats API integration for weekly crop-condition surveys.
//!
//! Retrieval is paginated by year, newest to oldest. An HTTP failure for one
//! year is logged and that year's contribution is simply absent; only "no data
//! at all across every year" is fatal. The same CSV schema is used for API
//! responses and for raw files previously exported by `wwcm run`, so offline
//! re-analysis goes through the identical parser.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::RawObservation;
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://quickstats.nass.usda.gov/api/api_GET/";

const API_KEY_ENV: &str = "QUICKSTATS_API_KEY";

/// The survey columns we read. QuickStats returns ~40 columns; serde matches
/// by header name and everything else is ignored.
#[derive(Debug, Deserialize)]
struct SurveyRow {
    load_time: Option<String>,
    week_ending: Option<String>,
    unit_desc: Option<String>,
    #[serde(rename = "Value")]
    value: Option<String>,
    state_name: Option<String>,
    commodity_desc: Option<String>,
    year: Option<String>,
}

pub struct QuickStatsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl QuickStatsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Build a client with the API key taken from the environment (`.env`
    /// supported via dotenvy).
    pub fn from_env(base_url: impl Into<String>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AppError::new(2, format!("Missing {API_KEY_ENV} in environment (.env).")))?;
        Ok(Self::new(base_url, api_key))
    }

    /// Fetch all survey rows for `start_year..=end_year`, newest first.
    ///
    /// Pagination stops early when a year returns an empty result set (the
    /// series does not reach further back). Zero rows overall is a fatal
    /// extraction error.
    pub fn fetch_range(
        &self,
        query: &BTreeMap<String, String>,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<RawObservation>, AppError> {
        let mut all = Vec::new();
        let mut year = end_year;
        while year >= start_year {
            match self.fetch_year(query, year) {
                Ok(rows) if rows.is_empty() => {
                    info!("no survey rows for {year}; stopping pagination");
                    break;
                }
                Ok(mut rows) => {
                    info!("fetched {} rows for {year}", rows.len());
                    all.append(&mut rows);
                }
                Err(err) => warn!("skipping year {year}: {err}"),
            }
            year -= 1;
        }

        if all.is_empty() {
            return Err(AppError::new(
                3,
                "No survey data returned from the QuickStats API for any requested year.",
            ));
        }
        Ok(all)
    }

    fn fetch_year(
        &self,
        query: &BTreeMap<String, String>,
        year: i32,
    ) -> Result<Vec<RawObservation>, AppError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("format", "CSV"),
                ("year", &year.to_string()),
            ])
            .query(query)
            .send()
            .map_err(|e| AppError::new(3, format!("QuickStats request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                3,
                format!("QuickStats request failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::new(3, format!("Failed to read QuickStats response: {e}")))?;

        let (rows, skipped) = parse_survey_csv(body.as_bytes())?;
        if skipped > 0 {
            warn!("{skipped} unparseable rows skipped for {year}");
        }
        Ok(rows)
    }
}

/// Read a previously exported raw survey CSV (offline re-analysis).
pub fn read_survey_csv(path: &Path) -> Result<Vec<RawObservation>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))?;
    let (rows, skipped) = parse_survey_csv(file)?;
    if skipped > 0 {
        warn!("{skipped} unparseable rows skipped in {}", path.display());
    }
    if rows.is_empty() {
        return Err(AppError::new(
            3,
            format!("No survey rows found in '{}'.", path.display()),
        ));
    }
    Ok(rows)
}

/// Parse survey CSV into raw observations.
///
/// Rows whose core fields (timestamp, week, category, value) fail to parse
/// are counted and skipped — ingest-level noise, reported by the caller. A
/// suppressed value such as `(D)` counts as unparseable.
pub fn parse_survey_csv<R: Read>(reader: R) -> Result<(Vec<RawObservation>, usize), AppError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut out = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.deserialize::<SurveyRow>() {
        let row = match result {
            Ok(row) => row,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        let parsed = (
            row.load_time.as_deref().and_then(parse_timestamp),
            row.week_ending.as_deref().and_then(parse_date),
            row.unit_desc,
            row.value.as_deref().and_then(parse_value),
        );
        let (Some(report_timestamp), Some(week_ending), Some(category), Some(value)) = parsed
        else {
            skipped += 1;
            continue;
        };

        out.push(RawObservation {
            report_timestamp,
            week_ending,
            category,
            value,
            state: row.state_name.filter(|s| !s.trim().is_empty()),
            commodity: row.commodity_desc.filter(|s| !s.trim().is_empty()),
            year: row.year.as_deref().and_then(|s| s.trim().parse().ok()),
        });
    }

    Ok((out, skipped))
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts);
        }
    }
    // Some extracts carry a bare date in load_time.
    parse_date(trimmed).and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_value(raw: &str) -> Option<f64> {
    // QuickStats formats thousands with commas and marks suppressed values
    // with codes like "(D)".
    let cleaned: String = raw.trim().replace(',', "");
    if cleaned.is_empty() || cleaned.starts_with('(') {
        return None;
    }
    let v = cleaned.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
commodity_desc,state_name,year,load_time,week_ending,unit_desc,Value,CV (%)
WHEAT,SOUTH DAKOTA,2024,2024-01-08 15:30:00.000,2024-01-06,PCT GOOD,30,
WHEAT,SOUTH DAKOTA,2024,2024-01-08 15:30:00.000,2024-01-06,PCT EXCELLENT,30,
WHEAT,SOUTH DAKOTA,2024,2024-01-08 15:30:00.000,2024-01-06,PCT FAIR,(D),
WHEAT,SOUTH DAKOTA,2024,not a time,2024-01-06,PCT POOR,10,
";

    #[test]
    fn parses_rows_and_counts_skips() {
        let (rows, skipped) = parse_survey_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(skipped, 2);

        let first = &rows[0];
        assert_eq!(first.category, "PCT GOOD");
        assert_eq!(first.value, 30.0);
        assert_eq!(
            first.week_ending,
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
        );
        assert_eq!(first.state.as_deref(), Some("SOUTH DAKOTA"));
        assert_eq!(first.year, Some(2024));
    }

    #[test]
    fn timestamp_formats_are_tolerated() {
        assert!(parse_timestamp("2024-01-08 15:30:00.000").is_some());
        assert!(parse_timestamp("2024-01-08 15:30:00").is_some());
        assert!(parse_timestamp("2024-01-08").is_some());
        assert!(parse_timestamp("08/01/2024").is_none());
    }

    #[test]
    fn suppressed_and_formatted_values() {
        assert_eq!(parse_value("1,234"), Some(1234.0));
        assert_eq!(parse_value(" 30 "), Some(30.0));
        assert_eq!(parse_value("(D)"), None);
        assert_eq!(parse_value(""), None);
    }
}
