//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the five condition categories and their ordinal weights (`Category`)
//! - observation records at each pipeline stage (`RawObservation`,
//!   `CleanedObservation`, `IndexedObservation`)
//! - the two series projections (`WeeklyIndex`, `CropYearMatrix`)
//! - the resolved run configuration (`RunConfig`)

pub mod types;

pub use types::*;
