//! Error types for the dream record pipeline.
//!
//! Only setup failures surface here. Per-row problems (unmapped devices,
//! missing profiles, dialogue failures) are defaulted and counted in the
//! [`RunReport`](crate::diagnostics::RunReport) instead.

use crate::classifier::ClassifierError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a batch before any output is written.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to decode JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write output {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error on config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let err = PipelineError::Io {
            path: PathBuf::from("light_data_backup.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("light_data_backup.json"));

        let err: PipelineError = ConfigError::Invalid {
            field: "max_lux",
            message: "must be positive".to_string(),
        }
        .into();
        assert!(err.to_string().contains("max_lux"));
    }
}
