//! The transformation pipeline: raw survey rows to time-series projections.
//!
//! Strictly linear, batch, no shared state:
//!
//! Cleaner (`clean`) -> IndexBuilder (`index`) -> SeriesProjector (`series`)
//!
//! Each stage consumes a fully materialized input and returns a new immutable
//! value; stage N completes before stage N+1 starts.

pub mod clean;
pub mod index;
pub mod series;

pub use clean::*;
pub use index::*;
pub use series::*;
