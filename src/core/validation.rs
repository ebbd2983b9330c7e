//! Raw moisture trust classification.

use crate::core::record::{AlignedRecord, SensorStatus};
use crate::diagnostics::RunReport;

/// Reading emitted by a stuck sensor; a hardware fault, not a measurement.
pub const STUCK_SENSOR_READING: f64 = 0.146;

/// Readings at or above this are treated as saturation faults.
pub const SATURATION_THRESHOLD: f64 = 0.95;

/// Classify a moisture reading. First match wins:
/// missing, stuck value, saturation, valid.
pub fn classify_sensor_status(avg_moisture: Option<f64>) -> SensorStatus {
    match avg_moisture {
        None => SensorStatus::Missing,
        Some(m) if m.is_nan() => SensorStatus::Missing,
        Some(m) if m == STUCK_SENSOR_READING => SensorStatus::InvalidFixed,
        Some(m) if m >= SATURATION_THRESHOLD => SensorStatus::SuspiciousHigh,
        Some(_) => SensorStatus::Valid,
    }
}

/// Assign a sensor status to every record.
pub fn validate_sensors(records: Vec<AlignedRecord>, report: &mut RunReport) -> Vec<AlignedRecord> {
    records
        .into_iter()
        .map(|record| {
            let status = classify_sensor_status(record.avg_moisture);
            report.status_counts.record(status);
            AlignedRecord {
                sensor_status: Some(status),
                ..record
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn test_status_precedence() {
        assert_eq!(classify_sensor_status(None), SensorStatus::Missing);
        assert_eq!(classify_sensor_status(Some(0.146)), SensorStatus::InvalidFixed);
        assert_eq!(classify_sensor_status(Some(0.97)), SensorStatus::SuspiciousHigh);
        assert_eq!(classify_sensor_status(Some(0.95)), SensorStatus::SuspiciousHigh);
        assert_eq!(classify_sensor_status(Some(0.5)), SensorStatus::Valid);
        assert_eq!(classify_sensor_status(Some(0.1461)), SensorStatus::Valid);
        assert_eq!(classify_sensor_status(Some(0.0)), SensorStatus::Valid);
    }

    #[test]
    fn test_include_in_model_follows_status() {
        let ts = NaiveDateTime::parse_from_str("2025-01-01T10:00:00", "%Y-%m-%dT%H:%M:%S").unwrap();
        let records: Vec<AlignedRecord> = [None, Some(0.146), Some(0.99), Some(0.42)]
            .into_iter()
            .map(|m| AlignedRecord::new("ESP32-06".to_string(), ts, m))
            .collect();

        let mut report = RunReport::new("S7test");
        let validated = validate_sensors(records, &mut report);

        let included: Vec<bool> = validated.iter().map(|r| r.include_in_model()).collect();
        assert_eq!(included, vec![false, false, false, true]);
        assert_eq!(report.status_counts.missing, 1);
        assert_eq!(report.status_counts.invalid_fixed, 1);
        assert_eq!(report.status_counts.suspicious_high, 1);
        assert_eq!(report.status_counts.valid, 1);
    }
}
