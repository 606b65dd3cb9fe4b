//! Input/output helpers.
//!
//! - table and summary exports (CSV/JSON) (`export`)
//!
//! Survey-CSV *reading* lives next to the API client in `data::quickstats`,
//! since exported raw files round-trip through the same schema.

pub mod export;

pub use export::*;
