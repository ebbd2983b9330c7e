//! Batch orchestration.
//!
//! [`Pipeline`] wires the stages of [`crate::core`] together over in-memory
//! inputs. [`run_batch`] is the file-based entry point: it performs every
//! fallible setup step before the first row is touched and writes the
//! output once, after the batch has completed.

use crate::classifier::{load_classifier, Classifier};
use crate::config::Config;
use crate::core::record::{AlignedRecord, DreamRecord, LightSource};
use crate::core::{
    align_nearest, apply_preferences, classify_records, fill_light_gaps, finalize_records,
    validate_sensors, IdentityMapper,
};
use crate::diagnostics::RunReport;
use crate::error::PipelineError;
use crate::export::{write_records, ExportFormat};
use crate::ingest::{read_light_log, read_moisture_log, LightEvent, MoistureEvent};
use crate::services::dialogue::{DialogueGenerator, TemplateDialogue};
use crate::services::profiles::{JsonProfileStore, ProfileStore};
use tracing::{info, warn};

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Exported records, in output order
    pub records: Vec<DreamRecord>,
    pub report: RunReport,
}

/// The stage sequence plus its collaborators.
pub struct Pipeline<'a> {
    config: &'a Config,
    classifier: &'a dyn Classifier,
    profiles: &'a dyn ProfileStore,
    dialogue: &'a dyn DialogueGenerator,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        classifier: &'a dyn Classifier,
        profiles: &'a dyn ProfileStore,
        dialogue: &'a dyn DialogueGenerator,
    ) -> Self {
        Self {
            config,
            classifier,
            profiles,
            dialogue,
        }
    }

    /// Run every stage over the given events.
    ///
    /// Only a classifier failure aborts the run. Lookup misses and per-row
    /// enrichment failures are defaulted and counted in the report.
    pub fn run(
        &self,
        moisture: Vec<MoistureEvent>,
        light: Vec<LightEvent>,
    ) -> Result<PipelineOutput, PipelineError> {
        let user_id = self.config.user_id.as_str();
        let mut report = RunReport::new(user_id);
        report.moisture_events = moisture.len();
        report.light_events = light.len();

        let records = align_nearest(moisture, light, self.config.alignment_tolerance);
        report.light.aligned = records.iter().filter(|r| r.light_timestamp.is_some()).count();
        info!(
            "Aligned {} moisture events ({} with a light reading)",
            records.len(),
            report.light.aligned
        );

        let records = fill_light_gaps(records, &self.config.gap_fill_settings());
        count_light_sources(&records, &mut report);

        let user = self.profiles.get_user(user_id);
        if user.is_none() {
            warn!("No profile found for user {user_id}, preferences default to false");
        }
        report.user_profile_found = user.is_some();
        let plants = self.profiles.get_user_plants(user_id);
        let mapper = IdentityMapper::new(&self.config.device_map, user.as_ref(), plants);
        let records = mapper.enrich(records, &mut report);

        let records = validate_sensors(records, &mut report);
        let records = classify_records(records, self.classifier, &mut report)?;
        let records = apply_preferences(records, &mut report);
        let records = finalize_records(records, user_id, self.dialogue, &mut report);

        Ok(PipelineOutput { records, report })
    }
}

fn count_light_sources(records: &[AlignedRecord], report: &mut RunReport) {
    for record in records {
        match record.light_source {
            Some(LightSource::Measured) => report.light.measured += 1,
            Some(LightSource::RollingAverage) => report.light.rolling_average += 1,
            Some(LightSource::Fallback) => report.light.fallback += 1,
            None => {}
        }
    }
}

/// Load inputs named by `config`, run the pipeline, and write the output.
///
/// Inputs, the classifier artifact, and a configured profile store are all
/// loaded before any processing starts; any failure there aborts the run
/// with nothing written.
pub fn run_batch(config: &Config, format: ExportFormat) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;

    let moisture = read_moisture_log(&config.moisture_log)?;
    let light = read_light_log(&config.light_log)?;
    let classifier = load_classifier(&config.model_path)?;
    let profiles = match &config.profile_store {
        Some(path) => {
            let store = JsonProfileStore::load(path)?;
            info!("Loaded {} user profiles from {}", store.user_count(), path.display());
            store
        }
        None => JsonProfileStore::empty(),
    };
    let dialogue = TemplateDialogue::default();

    let output = Pipeline::new(config, classifier.as_ref(), &profiles, &dialogue).run(moisture, light)?;

    write_records(&config.output_path, &output.records, format)?;
    info!(
        "Successfully generated {} dream records in {}",
        output.records.len(),
        config.output_path.display()
    );

    if let Some(path) = &config.diagnostics_path {
        if let Err(e) = output.report.save(path) {
            warn!("Failed to write run report to {}: {}", path.display(), e);
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierError, Features};
    use crate::core::record::{DreamType, SensorStatus};
    use crate::diagnostics::IntegrityWarning;
    use crate::services::profiles::{PlantPreference, PlantProfile, StoredUser, UserProfile};
    use chrono::NaiveDateTime;

    /// Sunny when bright, dry otherwise.
    struct Threshold;

    impl Classifier for Threshold {
        fn predict(&self, features: &[Features]) -> Result<Vec<i64>, ClassifierError> {
            Ok(features.iter().map(|f| if f[1] >= 30.0 { 1 } else { 0 }).collect())
        }

        fn name(&self) -> &'static str {
            "threshold"
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn predict(&self, _: &[Features]) -> Result<Vec<i64>, ClassifierError> {
            Err(ClassifierError::Prediction("backend offline".to_string()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn store() -> JsonProfileStore {
        let mut fern = PlantProfile::new("plant_01");
        fern.plant_type = Some("fern".to_string());
        fern.water_days = Some(3);

        JsonProfileStore::from_users(vec![StoredUser {
            profile: UserProfile {
                user_id: "S7test".to_string(),
                plant_preference: PlantPreference {
                    likes_bright_light: Some(true),
                    needs_frequent_water: None,
                },
            },
            plants: vec![fern],
        }])
    }

    #[test]
    fn test_report_counts_every_stage() {
        let config = Config::default();
        let profiles = store();
        let dialogue = TemplateDialogue::default();
        let pipeline = Pipeline::new(&config, &Threshold, &profiles, &dialogue);

        let moisture = vec![
            MoistureEvent::new("ESP32-06", ts("2025-01-01T10:00:00"), Some(0.30)),
            MoistureEvent::new("ESP32-06", ts("2025-01-01T10:01:00"), Some(0.146)),
            MoistureEvent::new("ESP32-99", ts("2025-01-01T10:03:00"), Some(0.50)),
            MoistureEvent::new("ESP32-08", ts("2025-01-01T11:00:00"), None),
        ];
        let light = vec![
            LightEvent::new(ts("2025-01-01T10:00:30"), Some(400.0)),
            LightEvent::new(ts("2025-01-01T10:01:10"), Some(200.0)),
        ];

        let output = pipeline.run(moisture, light).unwrap();
        let report = &output.report;

        assert_eq!(report.moisture_events, 4);
        assert_eq!(report.light_events, 2);
        assert_eq!(report.light.aligned, 2);
        assert_eq!(report.light.measured, 2);
        assert_eq!(report.light.rolling_average, 1);
        assert_eq!(report.light.fallback, 1);
        assert!(report.user_profile_found);
        assert_eq!(report.unmapped_device_ids, vec!["ESP32-99"]);
        assert_eq!(report.status_counts.valid, 2);
        assert_eq!(report.status_counts.invalid_fixed, 1);
        assert_eq!(report.status_counts.missing, 1);
        assert_eq!(report.predictions_requested, 3);
        assert_eq!(report.predictions_received, 3);
        assert_eq!(report.records_exported, 2);
        assert_eq!(
            report.warnings,
            vec![IntegrityWarning::UnmappedDevices {
                device_ids: vec!["ESP32-99".to_string()]
            }]
        );

        let first = &output.records[0];
        assert_eq!(first.plant_id.as_deref(), Some("plant_01"));
        assert_eq!(first.dream_type, Some(DreamType::Sunny));
        assert_eq!(first.dream_stamp_id, "#SUN-001");

        // Unmapped device still exported, with user-level preferences
        let second = &output.records[1];
        assert_eq!(second.plant_id, None);
        assert!(second.likes_bright_light);
        assert_eq!(second.sensor_status, SensorStatus::Valid);
    }

    #[test]
    fn test_missing_user_defaults_preferences() {
        let mut config = Config::default();
        config.user_id = "nobody".to_string();
        let profiles = store();
        let dialogue = TemplateDialogue::default();
        let pipeline = Pipeline::new(&config, &Threshold, &profiles, &dialogue);

        let moisture = vec![MoistureEvent::new("ESP32-06", ts("2025-01-01T10:00:00"), Some(0.3))];
        let output = pipeline.run(moisture, Vec::new()).unwrap();

        assert!(!output.report.user_profile_found);
        assert_eq!(output.report.rows_without_plant_profile, 1);
        let record = &output.records[0];
        assert_eq!(record.user_id, "nobody");
        assert!(!record.likes_bright_light);
        assert!(!record.needs_frequent_water);
        assert_eq!(record.plant_type, None);
        assert_eq!(record.light_level, Some(50.0));
    }

    #[test]
    fn test_classifier_failure_aborts() {
        let config = Config::default();
        let profiles = JsonProfileStore::empty();
        let dialogue = TemplateDialogue::default();
        let pipeline = Pipeline::new(&config, &Broken, &profiles, &dialogue);

        let moisture = vec![MoistureEvent::new("ESP32-06", ts("2025-01-01T10:00:00"), Some(0.3))];
        let result = pipeline.run(moisture, Vec::new());
        assert!(matches!(result, Err(PipelineError::Classifier(_))));
    }

    #[test]
    fn test_empty_inputs_produce_empty_output() {
        let config = Config::default();
        let profiles = JsonProfileStore::empty();
        let dialogue = TemplateDialogue::default();
        let pipeline = Pipeline::new(&config, &Broken, &profiles, &dialogue);

        let output = pipeline.run(Vec::new(), Vec::new()).unwrap();
        assert!(output.records.is_empty());
        assert_eq!(output.report.predictions_requested, 0);
    }

    #[test]
    fn test_run_batch_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.moisture_log = dir.path().join("moisture.json");
        config.light_log = dir.path().join("light.json");
        config.model_path = dir.path().join("missing_model.json");
        config.output_path = dir.path().join("out.json");
        std::fs::write(&config.moisture_log, "[]").unwrap();
        std::fs::write(&config.light_log, "[]").unwrap();

        let result = run_batch(&config, ExportFormat::Json);
        assert!(matches!(
            result,
            Err(PipelineError::Classifier(ClassifierError::Missing { .. }))
        ));
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_run_batch_rejects_invalid_config() {
        let mut config = Config::default();
        config.max_lux = -1.0;
        assert!(matches!(
            run_batch(&config, ExportFormat::Json),
            Err(PipelineError::Config(_))
        ));

        let mut config = Config::default();
        config.rolling_window = chrono::Duration::seconds(10_000_000_000_000);
        assert!(matches!(
            run_batch(&config, ExportFormat::Json),
            Err(PipelineError::Config(_))
        ));
    }
}
