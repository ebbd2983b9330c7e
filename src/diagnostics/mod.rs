//! Run diagnostics for the dream record pipeline.
//!
//! This module tracks what each batch ingested, defaulted, overrode, and
//! exported, and surfaces integrity warnings without halting the run.

pub mod report;

// Re-export commonly used types
pub use report::{IntegrityWarning, LightCounts, OverrideCounts, RunReport, StatusCounts};
