//! Raw sensor event types read from the hardware logs.
//!
//! Timestamps are normalised on the way in: any timezone offset is dropped
//! (wall-clock time kept) and the value is floored to the minute.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::Deserialize;

/// Output format for minute-resolution timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Naive layouts accepted after RFC 3339 parsing fails.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Offset layouts chrono's RFC 3339 parser rejects (e.g. `+0000`).
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// A soil moisture reading from one device.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoistureEvent {
    /// Hardware identifier of the reporting device
    pub device_id: String,
    /// Minute-resolution, timezone-naive timestamp
    #[serde(with = "minute_timestamp")]
    pub timestamp: NaiveDateTime,
    /// Averaged moisture fraction; absent when the device reported nothing
    #[serde(rename = "avgMoisture", default)]
    pub avg_moisture: Option<f64>,
    /// Upstream provenance tag, passed through to the output
    #[serde(default)]
    pub source: Option<String>,
}

impl MoistureEvent {
    pub fn new(device_id: impl Into<String>, timestamp: NaiveDateTime, avg_moisture: Option<f64>) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp: floor_to_minute(timestamp),
            avg_moisture,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// An ambient light reading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LightEvent {
    #[serde(with = "minute_timestamp")]
    pub timestamp: NaiveDateTime,
    /// Illuminance in lux; absent readings are gap-filled downstream
    #[serde(default)]
    pub lux: Option<f64>,
}

impl LightEvent {
    pub fn new(timestamp: NaiveDateTime, lux: Option<f64>) -> Self {
        Self {
            timestamp: floor_to_minute(timestamp),
            lux,
        }
    }
}

/// Parse an ISO-8601 timestamp, strip any offset, and floor to the minute.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(floor_to_minute(dt.naive_local()));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(floor_to_minute(dt.naive_local()));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(floor_to_minute(dt));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("unrecognised timestamp '{value}'"))
}

/// Drop seconds and sub-second precision.
pub fn floor_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Serde support for minute-resolution timestamps.
pub(crate) mod minute_timestamp {
    use super::{parse_timestamp, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
