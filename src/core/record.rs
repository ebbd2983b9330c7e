//! Record types shared by the pipeline stages.
//!
//! An [`AlignedRecord`] is created once per moisture event by the aligner
//! and rebuilt by each later stage. [`DreamRecord`] is the exported shape.

use crate::ingest::types::minute_timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validity classification of a raw moisture reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    /// No moisture value was reported
    Missing,
    /// Reading equals the stuck-sensor signature
    InvalidFixed,
    /// Reading at or above the saturation threshold
    SuspiciousHigh,
    Valid,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Missing => "missing",
            SensorStatus::InvalidFixed => "invalid_fixed",
            SensorStatus::SuspiciousHigh => "suspicious_high",
            SensorStatus::Valid => "valid",
        }
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorical label describing the plant's environmental state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DreamType {
    Dry,
    Sunny,
    Misty,
    Rainy,
}

impl DreamType {
    pub const ALL: [DreamType; 4] = [
        DreamType::Dry,
        DreamType::Sunny,
        DreamType::Misty,
        DreamType::Rainy,
    ];

    /// Map a classifier output index to a label.
    pub fn from_class_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(DreamType::Dry),
            1 => Some(DreamType::Sunny),
            2 => Some(DreamType::Misty),
            3 => Some(DreamType::Rainy),
            _ => None,
        }
    }

    pub fn mood(&self) -> MoodTag {
        match self {
            DreamType::Dry => MoodTag::Sad,
            DreamType::Sunny => MoodTag::Joyful,
            DreamType::Misty => MoodTag::Dreamy,
            DreamType::Rainy => MoodTag::Relieved,
        }
    }

    /// Three-letter prefix used in dream stamp IDs.
    pub fn stamp_prefix(&self) -> &'static str {
        match self {
            DreamType::Sunny => "SUN",
            DreamType::Dry => "DRY",
            DreamType::Misty => "MIS",
            DreamType::Rainy => "RAI",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DreamType::Dry => "dry",
            DreamType::Sunny => "sunny",
            DreamType::Misty => "misty",
            DreamType::Rainy => "rainy",
        }
    }
}

impl fmt::Display for DreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display label derived 1:1 from the dream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTag {
    Sad,
    Joyful,
    Dreamy,
    Relieved,
}

/// Where a record's light level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightSource {
    /// Normalised from an aligned lux reading
    Measured,
    /// Mean of measured levels in the trailing window
    RollingAverage,
    /// Static fallback level
    Fallback,
}

/// Effective per-row preferences after the profile fallback chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub likes_bright_light: bool,
    pub needs_frequent_water: bool,
}

/// One moisture event joined to at most one light reading and enriched
/// through the pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRecord {
    pub device_id: String,
    pub timestamp: NaiveDateTime,
    pub avg_moisture: Option<f64>,
    pub source: Option<String>,
    /// Timestamp of the attached light reading, if one was within tolerance
    pub light_timestamp: Option<NaiveDateTime>,
    pub lux: Option<f64>,
    /// Percentage in [0, 100]
    pub light_level: Option<f64>,
    pub light_source: Option<LightSource>,
    pub plant_id: Option<String>,
    pub plant_type: Option<String>,
    pub water_days: Option<u32>,
    pub health_score: Option<f64>,
    pub preferences: Preferences,
    pub sensor_status: Option<SensorStatus>,
    /// Label as returned by the classifier
    pub raw_dream_type: Option<DreamType>,
    /// Label after preference overrides
    pub dream_type: Option<DreamType>,
}

impl AlignedRecord {
    /// Record straight out of alignment, with every enrichment field unset.
    pub fn new(device_id: String, timestamp: NaiveDateTime, avg_moisture: Option<f64>) -> Self {
        Self {
            device_id,
            timestamp,
            avg_moisture,
            source: None,
            light_timestamp: None,
            lux: None,
            light_level: None,
            light_source: None,
            plant_id: None,
            plant_type: None,
            water_days: None,
            health_score: None,
            preferences: Preferences::default(),
            sensor_status: None,
            raw_dream_type: None,
            dream_type: None,
        }
    }

    /// True iff the sensor status is `valid`.
    pub fn include_in_model(&self) -> bool {
        self.sensor_status == Some(SensorStatus::Valid)
    }

    /// Classifier input, if both features are present.
    pub fn features(&self) -> Option<[f64; 2]> {
        Some([self.avg_moisture?, self.light_level?])
    }
}

/// Exported record. Field order is the presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamRecord {
    pub user_id: String,
    pub plant_id: Option<String>,
    pub plant_type: Option<String>,
    pub water_days: Option<u32>,
    pub light_level: Option<f64>,
    #[serde(rename = "avgMoisture")]
    pub avg_moisture: Option<f64>,
    pub health_score: Option<f64>,
    pub dream_type: Option<DreamType>,
    pub mood_tag: Option<MoodTag>,
    pub dream_stamp_id: String,
    pub dream_dialogue: Option<String>,
    #[serde(with = "minute_timestamp")]
    pub timestamp: NaiveDateTime,
    pub source: Option<String>,
    pub sensor_status: SensorStatus,
    pub include_in_model: bool,
    pub needs_frequent_water: bool,
    pub likes_bright_light: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_index_table() {
        assert_eq!(DreamType::from_class_index(0), Some(DreamType::Dry));
        assert_eq!(DreamType::from_class_index(1), Some(DreamType::Sunny));
        assert_eq!(DreamType::from_class_index(2), Some(DreamType::Misty));
        assert_eq!(DreamType::from_class_index(3), Some(DreamType::Rainy));
        assert_eq!(DreamType::from_class_index(4), None);
        assert_eq!(DreamType::from_class_index(-1), None);
    }

    #[test]
    fn test_mood_and_prefix_tables() {
        assert_eq!(DreamType::Dry.mood(), MoodTag::Sad);
        assert_eq!(DreamType::Sunny.mood(), MoodTag::Joyful);
        assert_eq!(DreamType::Misty.mood(), MoodTag::Dreamy);
        assert_eq!(DreamType::Rainy.mood(), MoodTag::Relieved);

        assert_eq!(DreamType::Sunny.stamp_prefix(), "SUN");
        assert_eq!(DreamType::Dry.stamp_prefix(), "DRY");
        assert_eq!(DreamType::Misty.stamp_prefix(), "MIS");
        assert_eq!(DreamType::Rainy.stamp_prefix(), "RAI");
    }

    #[test]
    fn test_features_require_both_values() {
        let ts = NaiveDateTime::parse_from_str("2025-01-01T10:00:00", "%Y-%m-%dT%H:%M:%S").unwrap();
        let mut record = AlignedRecord::new("ESP32-06".to_string(), ts, Some(0.3));
        assert_eq!(record.features(), None);

        record.light_level = Some(40.0);
        assert_eq!(record.features(), Some([0.3, 40.0]));

        record.avg_moisture = None;
        assert_eq!(record.features(), None);
    }

    #[test]
    fn test_dream_record_field_order() {
        let ts = NaiveDateTime::parse_from_str("2025-01-01T10:00:00", "%Y-%m-%dT%H:%M:%S").unwrap();
        let record = DreamRecord {
            user_id: "S7test".to_string(),
            plant_id: Some("plant_01".to_string()),
            plant_type: None,
            water_days: Some(3),
            light_level: Some(40.0),
            avg_moisture: Some(0.3),
            health_score: None,
            dream_type: Some(DreamType::Sunny),
            mood_tag: Some(MoodTag::Joyful),
            dream_stamp_id: "#SUN-001".to_string(),
            dream_dialogue: None,
            timestamp: ts,
            source: None,
            sensor_status: SensorStatus::Valid,
            include_in_model: true,
            needs_frequent_water: false,
            likes_bright_light: true,
        };

        let json = serde_json::to_string(&record).unwrap();
        let keys: Vec<&str> = [
            "user_id",
            "plant_id",
            "plant_type",
            "water_days",
            "light_level",
            "avgMoisture",
            "health_score",
            "dream_type",
            "mood_tag",
            "dream_stamp_id",
            "dream_dialogue",
            "timestamp",
            "source",
            "sensor_status",
            "include_in_model",
            "needs_frequent_water",
            "likes_bright_light",
        ]
        .to_vec();

        let positions: Vec<usize> = keys
            .iter()
            .map(|k| json.find(&format!("\"{k}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains(r#""timestamp":"2025-01-01T10:00:00""#));
        assert!(json.contains(r#""dream_type":"sunny""#));
        assert!(json.contains(r#""mood_tag":"joyful""#));
    }
}
