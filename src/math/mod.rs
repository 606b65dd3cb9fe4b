//! Numeric helpers shared by the analysis code.
//!
//! - descriptive aggregates (`stats`)
//! - explicit windowed aggregates over ordered sequences (`rolling`)

pub mod rolling;
pub mod stats;

pub use rolling::*;
pub use stats::*;
