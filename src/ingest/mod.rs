//! Ingestion of the two asynchronously sampled sensor logs.
//!
//! This module provides the raw event types for the soil moisture and
//! ambient light streams and the readers that load them from JSON files.

pub mod reader;
pub mod types;

// Re-export commonly used types
pub use reader::{read_light_log, read_moisture_log};
pub use types::{floor_to_minute, parse_timestamp, LightEvent, MoistureEvent, TIMESTAMP_FORMAT};
