//! `wwc-monitor` library crate.
//!
//! The binary (`wwcm`) is a thin wrapper around this library so that:
//!
//! - the transformation pipeline is testable without spawning processes
//! - modules are reusable (e.g., future dashboards, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod risk;
pub mod transform;
