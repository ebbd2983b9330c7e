//! Writing exported dream records.
//!
//! Output is serialised fully in memory, written to a sibling temp file,
//! and renamed into place. A failed run never leaves a partial file.

use crate::core::record::DreamRecord;
use crate::error::PipelineError;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Output file layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Pretty-printed JSON array
    #[default]
    Json,
    /// One JSON object per line
    Jsonl,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => f.write_str("json"),
            ExportFormat::Jsonl => f.write_str("jsonl"),
        }
    }
}

/// Serialise records in the given format.
pub fn render_records(records: &[DreamRecord], format: ExportFormat) -> Result<String, PipelineError> {
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(records).map_err(PipelineError::Serialize),
        ExportFormat::Jsonl => {
            let mut out = String::new();
            for record in records {
                out.push_str(&serde_json::to_string(record).map_err(PipelineError::Serialize)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// Write records to `path` atomically.
pub fn write_records(path: &Path, records: &[DreamRecord], format: ExportFormat) -> Result<(), PipelineError> {
    let content = render_records(records, format)?;
    write_atomic(path, content.as_bytes())
}

/// Write bytes to a temp file next to `path`, then rename it into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    let write_err = |source: std::io::Error| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp = temp_path(path);
    if let Err(e) = std::fs::write(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(e));
    }

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        write_err(e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{DreamType, SensorStatus};
    use chrono::NaiveDateTime;

    fn record(seq: usize) -> DreamRecord {
        DreamRecord {
            user_id: "S7test".to_string(),
            plant_id: Some("plant_01".to_string()),
            plant_type: Some("fern".to_string()),
            water_days: Some(3),
            light_level: Some(40.0),
            avg_moisture: Some(0.3),
            health_score: None,
            dream_type: Some(DreamType::Sunny),
            mood_tag: Some(DreamType::Sunny.mood()),
            dream_stamp_id: format!("#SUN-{seq:03}"),
            dream_dialogue: Some("Basking in the light!".to_string()),
            timestamp: NaiveDateTime::parse_from_str("2025-01-01T10:00:00", "%Y-%m-%dT%H:%M:%S").unwrap(),
            source: None,
            sensor_status: SensorStatus::Valid,
            include_in_model: true,
            needs_frequent_water: false,
            likes_bright_light: true,
        }
    }

    #[test]
    fn test_json_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("dream_record_log_labeled.json");

        write_records(&path, &[record(1), record(2)], ExportFormat::Json).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<DreamRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(content.contains("\n  {"));

        // No temp files left behind
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_jsonl_export() {
        let rendered = render_records(&[record(1), record(2)], ExportFormat::Jsonl).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("#SUN-002"));
        // Every record, including the last, is newline-terminated
        assert!(rendered.ends_with("}\n"));
        assert_eq!(rendered.matches('\n').count(), 2);
        assert_eq!(render_records(&[], ExportFormat::Jsonl).unwrap(), "");
    }

    #[test]
    fn test_empty_export_is_an_empty_array() {
        assert_eq!(render_records(&[], ExportFormat::Json).unwrap(), "[]");
    }

    #[test]
    fn test_format_parsing() {
        use clap::ValueEnum;

        assert_eq!(ExportFormat::from_str("jsonl", false).unwrap(), ExportFormat::Jsonl);
        assert_eq!(ExportFormat::from_str("JSON", true).unwrap(), ExportFormat::Json);
        assert!(ExportFormat::from_str("csv", false).is_err());
        assert_eq!(ExportFormat::default().to_string(), "json");
    }
}
