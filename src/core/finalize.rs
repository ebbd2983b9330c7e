//! Export filtering, stamp sequencing, and outbound record assembly.

use crate::core::record::{AlignedRecord, DreamRecord, DreamType, SensorStatus};
use crate::diagnostics::RunReport;
use crate::services::dialogue::DialogueGenerator;

/// Prefix used when a record has no dream type.
pub const UNKNOWN_STAMP_PREFIX: &str = "UNK";

/// Build a stamp ID such as `#SUN-003` from a dream type and a 1-based position.
pub fn dream_stamp_id(dream_type: Option<DreamType>, seq: usize) -> String {
    let prefix = dream_type.map_or(UNKNOWN_STAMP_PREFIX, |d| d.stamp_prefix());
    format!("#{prefix}-{seq:03}")
}

/// Keep only `include_in_model` rows and turn them into export records.
///
/// Sequence numbers are assigned after filtering, so the first exported
/// row is always `-001`. Dialogue is generated once per exported row; a
/// generator failure leaves `dream_dialogue` empty.
pub fn finalize_records(
    records: Vec<AlignedRecord>,
    user_id: &str,
    dialogue: &dyn DialogueGenerator,
    report: &mut RunReport,
) -> Vec<DreamRecord> {
    let exported: Vec<DreamRecord> = records
        .into_iter()
        .filter(AlignedRecord::include_in_model)
        .enumerate()
        .map(|(i, record)| {
            let mut out = DreamRecord {
                user_id: user_id.to_string(),
                plant_id: record.plant_id,
                plant_type: record.plant_type,
                water_days: record.water_days,
                light_level: record.light_level,
                avg_moisture: record.avg_moisture,
                health_score: record.health_score,
                dream_type: record.dream_type,
                mood_tag: record.dream_type.map(|d| d.mood()),
                dream_stamp_id: dream_stamp_id(record.dream_type, i + 1),
                dream_dialogue: None,
                timestamp: record.timestamp,
                source: record.source,
                sensor_status: record.sensor_status.unwrap_or(SensorStatus::Valid),
                include_in_model: true,
                needs_frequent_water: record.preferences.needs_frequent_water,
                likes_bright_light: record.preferences.likes_bright_light,
            };

            match dialogue.make_dialogue(&out) {
                Ok(generated) => out.dream_dialogue = Some(generated.text),
                Err(e) => {
                    tracing::debug!("Dialogue generation failed for {}: {}", out.dream_stamp_id, e);
                    report.dialogue_failures += 1;
                }
            }

            out
        })
        .collect();

    report.records_exported = exported.len();
    exported
}
