//! Loading of the moisture and light logs from disk.

use crate::error::PipelineError;
use crate::ingest::types::{LightEvent, MoistureEvent};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read the soil moisture log (a JSON array of moisture events).
pub fn read_moisture_log(path: &Path) -> Result<Vec<MoistureEvent>, PipelineError> {
    read_json_array(path)
}

/// Read the ambient light log (a JSON array of light events).
pub fn read_light_log(path: &Path) -> Result<Vec<LightEvent>, PipelineError> {
    read_json_array(path)
}

pub(crate) fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PipelineError> {
    let content = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let events: Vec<T> = serde_json::from_str(&content).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Read {} entries from {}", events.len(), path.display());
    Ok(events)
}
