//! Dream type classifiers.
//!
//! The pipeline only depends on the [`Classifier`] capability: a batch of
//! `(avgMoisture, light_level)` feature pairs in, one class index per pair
//! out. Concrete backends are loaded from a JSON model artifact tagged by
//! `kind`.
//!
//! # Example
//!
//! ```no_run
//! use plant_dream_pipeline::classifier::{load_classifier, Classifier};
//! use std::path::Path;
//!
//! let model = load_classifier(Path::new("dream_model.json")).expect("model artifact");
//! let classes = model.predict(&[[0.30, 40.0]]).expect("prediction");
//! assert_eq!(classes.len(), 1);
//! ```

mod rules;
mod tree;

pub use rules::{Bounds, Rule, RuleTable};
pub use tree::{DecisionTree, TreeNode};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Feature pair in classifier column order: moisture, then light level.
pub type Features = [f64; 2];

/// Column names matching [`Features`] indices.
pub const FEATURE_NAMES: [&str; 2] = ["avgMoisture", "light_level"];

/// A categorical model over moisture and light features.
pub trait Classifier {
    /// Predict one class index per input row.
    fn predict(&self, features: &[Features]) -> Result<Vec<i64>, ClassifierError>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Classifier loading and prediction errors.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model artifact {path} could not be read: {source}")]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Model artifact {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid model: {0}")]
    InvalidModel(String),
    #[error("Prediction failed: {0}")]
    Prediction(String),
}

/// On-disk model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    DecisionTree(DecisionTree),
    RuleTable(RuleTable),
}

impl ModelArtifact {
    /// Validate the artifact and turn it into a usable classifier.
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ClassifierError> {
        match self {
            ModelArtifact::DecisionTree(tree) => {
                tree.validate()?;
                Ok(Box::new(tree))
            }
            ModelArtifact::RuleTable(table) => {
                table.validate()?;
                Ok(Box::new(table))
            }
        }
    }
}

/// Load a classifier from a JSON model artifact.
pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, ClassifierError> {
    let content = std::fs::read_to_string(path).map_err(|source| ClassifierError::Missing {
        path: path.to_path_buf(),
        source,
    })?;

    let artifact: ModelArtifact =
        serde_json::from_str(&content).map_err(|source| ClassifierError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    let classifier = artifact.into_classifier()?;
    tracing::info!("Loaded {} classifier from {}", classifier.name(), path.display());
    Ok(classifier)
}
