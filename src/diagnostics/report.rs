//! Per-run report of what the pipeline saw and decided.
//!
//! The report collects counters from every stage plus the integrity
//! warnings raised along the way. It never affects the exported records.

use crate::core::record::SensorStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Non-fatal data integrity problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityWarning {
    /// Devices with no plant registration, in first-seen order
    UnmappedDevices { device_ids: Vec<String> },
    /// Classifier returned a different number of predictions than rows sent
    PredictionCountMismatch { expected: usize, received: usize },
    /// Classifier returned an index outside the label table
    UnknownClassIndex { index: i64, rows: usize },
}

/// Row counts per sensor status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub missing: usize,
    pub invalid_fixed: usize,
    pub suspicious_high: usize,
    pub valid: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: SensorStatus) {
        match status {
            SensorStatus::Missing => self.missing += 1,
            SensorStatus::InvalidFixed => self.invalid_fixed += 1,
            SensorStatus::SuspiciousHigh => self.suspicious_high += 1,
            SensorStatus::Valid => self.valid += 1,
        }
    }
}

/// How each row's light level was obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightCounts {
    /// Rows with a light reading attached by alignment
    pub aligned: usize,
    pub measured: usize,
    pub rolling_average: usize,
    pub fallback: usize,
}

/// Override rule hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideCounts {
    pub dim_light: usize,
    pub dry_soil: usize,
}

/// Diagnostics for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub moisture_events: usize,
    pub light_events: usize,
    pub light: LightCounts,
    pub unmapped_device_ids: Vec<String>,
    pub rows_without_plant_profile: usize,
    pub user_profile_found: bool,
    pub status_counts: StatusCounts,
    pub predictions_requested: usize,
    pub predictions_received: usize,
    pub overrides: OverrideCounts,
    pub dialogue_failures: usize,
    pub records_exported: usize,
    pub warnings: Vec<IntegrityWarning>,
}

impl RunReport {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            user_id: user_id.into(),
            started_at: Utc::now(),
            moisture_events: 0,
            light_events: 0,
            light: LightCounts::default(),
            unmapped_device_ids: Vec::new(),
            rows_without_plant_profile: 0,
            user_profile_found: false,
            status_counts: StatusCounts::default(),
            predictions_requested: 0,
            predictions_received: 0,
            overrides: OverrideCounts::default(),
            dialogue_failures: 0,
            records_exported: 0,
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, warning: IntegrityWarning) {
        self.warnings.push(warning);
    }

    /// Remember an unmapped device, once per distinct ID.
    pub fn record_unmapped_device(&mut self, device_id: &str) {
        if !self.unmapped_device_ids.iter().any(|d| d == device_id) {
            self.unmapped_device_ids.push(device_id.to_string());
        }
    }

    /// Count a row whose predicted index has no label.
    pub fn record_unknown_class(&mut self, class: i64) {
        for warning in &mut self.warnings {
            if let IntegrityWarning::UnknownClassIndex { index, rows } = warning {
                if *index == class {
                    *rows += 1;
                    return;
                }
            }
        }
        self.warn(IntegrityWarning::UnknownClassIndex {
            index: class,
            rows: 1,
        });
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "Run Summary ({}):\n\
             - User: {}{}\n\
             - Moisture events: {}\n\
             - Light events: {} ({} rows aligned)\n\
             - Light levels: {} measured, {} rolling average, {} fallback\n\
             - Unmapped devices: {}\n\
             - Sensor status: {} valid, {} missing, {} invalid_fixed, {} suspicious_high\n\
             - Predictions: {} requested, {} received\n\
             - Overrides: {} dim light, {} dry soil\n\
             - Dialogue failures: {}\n\
             - Records exported: {}\n\
             - Integrity warnings: {}",
            self.run_id,
            self.user_id,
            if self.user_profile_found { "" } else { " (no profile)" },
            self.moisture_events,
            self.light_events,
            self.light.aligned,
            self.light.measured,
            self.light.rolling_average,
            self.light.fallback,
            if self.unmapped_device_ids.is_empty() {
                "none".to_string()
            } else {
                self.unmapped_device_ids.join(", ")
            },
            self.status_counts.valid,
            self.status_counts.missing,
            self.status_counts.invalid_fixed,
            self.status_counts.suspicious_high,
            self.predictions_requested,
            self.predictions_received,
            self.overrides.dim_light,
            self.overrides.dry_soil,
            self.dialogue_failures,
            self.records_exported,
            self.warnings.len()
        )
    }

    /// Write the report as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
