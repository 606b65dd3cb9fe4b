//! Data retrieval.
//!
//! - USDA QuickStats API client and survey-CSV parsing (`quickstats`)

pub mod quickstats;

pub use quickstats::*;
