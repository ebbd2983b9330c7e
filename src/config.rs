//! Configuration for the dream record pipeline.

use crate::core::alignment::DEFAULT_TOLERANCE_SECS;
use crate::core::gapfill::{
    GapFillSettings, DEFAULT_FALLBACK_LIGHT_LEVEL, DEFAULT_MAX_LUX, DEFAULT_ROLLING_WINDOW_SECS,
};
use crate::core::identity::default_device_map;
use crate::error::ConfigError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// User selected when neither the config file nor `USER_ID` names one.
pub const DEFAULT_USER_ID: &str = "S7test";

/// Environment variable overriding [`Config::user_id`].
pub const USER_ID_ENV: &str = "USER_ID";

/// Longest accepted alignment tolerance or rolling window (one day).
pub const MAX_WINDOW_SECS: i64 = 86_400;

/// Main configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// User whose profiles drive preferences and whose ID is stamped on output
    pub user_id: String,

    /// Moisture event log (JSON array)
    pub moisture_log: PathBuf,

    /// Light event log (JSON array)
    pub light_log: PathBuf,

    /// Classifier artifact
    pub model_path: PathBuf,

    /// Profile store file; when unset every profile lookup misses
    pub profile_store: Option<PathBuf>,

    /// Where the labeled records are written
    pub output_path: PathBuf,

    /// Optional run report destination
    pub diagnostics_path: Option<PathBuf>,

    /// Maximum distance between a moisture event and its light reading
    #[serde(with = "duration_serde")]
    pub alignment_tolerance: Duration,

    /// Trailing window for the rolling light average
    #[serde(with = "duration_serde")]
    pub rolling_window: Duration,

    /// Light level used when no measurement is available
    pub fallback_light_level: f64,

    /// Lux value that maps to a light level of 100
    pub max_lux: f64,

    /// Device ID to plant ID registrations
    pub device_map: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            moisture_log: PathBuf::from("dream_record_log_real.json"),
            light_log: PathBuf::from("light_data_backup.json"),
            model_path: PathBuf::from("dream_model.json"),
            profile_store: None,
            output_path: PathBuf::from("dream_record_log_labeled.json"),
            diagnostics_path: None,
            alignment_tolerance: Duration::seconds(DEFAULT_TOLERANCE_SECS),
            rolling_window: Duration::seconds(DEFAULT_ROLLING_WINDOW_SECS),
            fallback_light_level: DEFAULT_FALLBACK_LIGHT_LEVEL,
            max_lux: DEFAULT_MAX_LUX,
            device_map: default_device_map(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(io_err)
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plant-dream-pipeline")
            .join("config.json")
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_user_id(std::env::var(USER_ID_ENV).ok());
    }

    /// Replace the user ID with a non-blank override.
    pub fn apply_user_id(&mut self, user_id: Option<String>) {
        if let Some(id) = user_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            self.user_id = id;
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_id.trim().is_empty() {
            return Err(invalid("user_id", "must not be empty"));
        }
        if !(self.max_lux.is_finite() && self.max_lux > 0.0) {
            return Err(invalid("max_lux", format!("must be positive, got {}", self.max_lux)));
        }
        let max_window = Duration::seconds(MAX_WINDOW_SECS);
        if self.rolling_window <= Duration::zero() || self.rolling_window > max_window {
            return Err(invalid(
                "rolling_window",
                format!(
                    "must lie in (0, {MAX_WINDOW_SECS}]s, got {}s",
                    self.rolling_window.num_seconds()
                ),
            ));
        }
        if self.alignment_tolerance < Duration::zero() || self.alignment_tolerance > max_window {
            return Err(invalid(
                "alignment_tolerance",
                format!(
                    "must lie in [0, {MAX_WINDOW_SECS}]s, got {}s",
                    self.alignment_tolerance.num_seconds()
                ),
            ));
        }
        if !(0.0..=100.0).contains(&self.fallback_light_level) {
            return Err(invalid(
                "fallback_light_level",
                format!("must lie in [0, 100], got {}", self.fallback_light_level),
            ));
        }
        Ok(())
    }

    pub fn gap_fill_settings(&self) -> GapFillSettings {
        GapFillSettings {
            max_lux: self.max_lux,
            window: self.rolling_window,
            fallback_level: self.fallback_light_level,
        }
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

/// Serde support for Duration as whole seconds.
mod duration_serde {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.num_seconds().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = i64::deserialize(deserializer)?;
        Duration::try_seconds(secs)
            .ok_or_else(|| D::Error::custom(format!("duration of {secs}s is out of range")))
    }
}
