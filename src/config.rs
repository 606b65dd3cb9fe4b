//! Run parameters loaded from an optional `params.json`.
//!
//! The file mirrors what operators already maintain for the survey extract:
//! API URL, the fixed QuickStats query, and the pagination year range. CLI
//! flags override file values; sensible winter-wheat defaults cover the rest.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::{Datelike, Local};
use serde::Deserialize;

use crate::data::quickstats::DEFAULT_BASE_URL;
use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunParams {
    pub qs_url: String,
    /// Fixed query parameters sent with every yearly request.
    pub query: BTreeMap<String, String>,
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            qs_url: DEFAULT_BASE_URL.to_string(),
            query: default_query(),
            start_year: 2000,
            end_year: Local::now().year(),
        }
    }
}

/// Winter wheat condition survey, South Dakota, state level.
fn default_query() -> BTreeMap<String, String> {
    [
        ("source_desc", "SURVEY"),
        ("sector_desc", "CROPS"),
        ("commodity_desc", "WHEAT"),
        ("class_desc", "WINTER"),
        ("statisticcat_desc", "CONDITION"),
        ("agg_level_desc", "STATE"),
        ("state_alpha", "SD"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Load run parameters.
///
/// With an explicit path the file must exist and parse; without one,
/// `params.json` in the working directory is used when present, else the
/// defaults.
pub fn load_params(path: Option<&Path>) -> Result<RunParams, AppError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let fallback = Path::new("params.json");
            if !fallback.exists() {
                return Ok(RunParams::default());
            }
            fallback.to_path_buf()
        }
    };

    let file = File::open(&path)
        .map_err(|e| AppError::new(2, format!("Failed to open '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Failed to parse '{}': {e}", path.display())))
}
