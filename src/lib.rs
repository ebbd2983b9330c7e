//! Plant Dream Pipeline - labeled dream records from plant sensor logs.
//!
//! This library joins a soil moisture stream with an ambient light stream,
//! validates and classifies each reading, and exports display-ready "dream"
//! records for the plants of one user.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Plant Dream Pipeline                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐               │
//! │  │  Ingest   │──▶│  Aligner  │──▶│ Gap Fill  │               │
//! │  │ (2 logs)  │   │ (±1 min)  │   │ (3 min)   │               │
//! │  └───────────┘   └───────────┘   └───────────┘               │
//! │                                        │                      │
//! │                                        ▼                      │
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐               │
//! │  │ Classify  │◀──│ Validator │◀──│ Identity  │◀── Profiles   │
//! │  │ (model)   │   │ (status)  │   │ (plants)  │               │
//! │  └───────────┘   └───────────┘   └───────────┘               │
//! │        │                                                      │
//! │        ▼                                                      │
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐               │
//! │  │Preference │──▶│ Finalize  │──▶│  Export   │               │
//! │  │ overrides │   │ (stamps)  │   │ (atomic)  │               │
//! │  └───────────┘   └───────────┘   └───────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use plant_dream_pipeline::{export::ExportFormat, pipeline, Config};
//!
//! let config = Config::load().unwrap_or_default();
//! let output = pipeline::run_batch(&config, ExportFormat::Json)?;
//! println!("{}", output.report.summary());
//! # Ok::<(), plant_dream_pipeline::PipelineError>(())
//! ```

pub mod classifier;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pipeline;
pub mod services;

// Re-export key types at crate root for convenience
pub use classifier::{load_classifier, Classifier, ClassifierError, ModelArtifact};
pub use config::Config;
pub use core::{AlignedRecord, DreamRecord, DreamType, MoodTag, SensorStatus};
pub use diagnostics::{IntegrityWarning, RunReport};
pub use error::{ConfigError, PipelineError};
pub use pipeline::{run_batch, Pipeline, PipelineOutput};
pub use services::{DialogueGenerator, JsonProfileStore, ProfileStore, TemplateDialogue};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
