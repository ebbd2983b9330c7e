//! Classifier adapter: feature extraction, prediction, label mapping.

use crate::classifier::{Classifier, ClassifierError, Features};
use crate::core::record::{AlignedRecord, DreamType};
use crate::diagnostics::{IntegrityWarning, RunReport};

/// Predict a raw dream type for every row that has both features.
///
/// Rows are scored regardless of sensor status; rows missing a feature keep
/// an unset label. When the classifier returns a different number of
/// predictions than requested, labels are assigned pairwise up to the
/// shorter length and an integrity warning is recorded.
pub fn classify_records(
    records: Vec<AlignedRecord>,
    classifier: &dyn Classifier,
    report: &mut RunReport,
) -> Result<Vec<AlignedRecord>, ClassifierError> {
    let (rows, features): (Vec<usize>, Vec<Features>) = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.features().map(|f| (i, f)))
        .unzip();

    let predictions = if features.is_empty() {
        Vec::new()
    } else {
        classifier.predict(&features)?
    };

    report.predictions_requested = features.len();
    report.predictions_received = predictions.len();
    if predictions.len() != features.len() {
        tracing::warn!(
            "Number of predictions ({}) doesn't match input rows ({})",
            predictions.len(),
            features.len()
        );
        report.warn(IntegrityWarning::PredictionCountMismatch {
            expected: features.len(),
            received: predictions.len(),
        });
    }

    let mut labels: Vec<Option<DreamType>> = vec![None; records.len()];
    for (&row, &class) in rows.iter().zip(&predictions) {
        match DreamType::from_class_index(class) {
            Some(label) => labels[row] = Some(label),
            None => {
                tracing::warn!("Classifier returned unknown class index {class} for row {row}");
                report.record_unknown_class(class);
            }
        }
    }

    tracing::debug!(
        "Classified {} of {} rows with {}",
        predictions.len(),
        records.len(),
        classifier.name()
    );

    Ok(records
        .into_iter()
        .zip(labels)
        .map(|(record, label)| AlignedRecord {
            raw_dream_type: label,
            dream_type: label,
            ..record
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::cell::RefCell;

    /// Returns a fixed sequence of indices and records what it was asked.
    struct Scripted {
        output: Vec<i64>,
        seen: RefCell<Vec<Features>>,
    }

    impl Scripted {
        fn new(output: Vec<i64>) -> Self {
            Self {
                output,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Classifier for Scripted {
        fn predict(&self, features: &[Features]) -> Result<Vec<i64>, ClassifierError> {
            self.seen.borrow_mut().extend_from_slice(features);
            Ok(self.output.clone())
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn record(moisture: Option<f64>, light: Option<f64>) -> AlignedRecord {
        let ts = NaiveDateTime::parse_from_str("2025-01-01T10:00:00", "%Y-%m-%dT%H:%M:%S").unwrap();
        let mut r = AlignedRecord::new("ESP32-06".to_string(), ts, moisture);
        r.light_level = light;
        r
    }

    #[test]
    fn test_only_rows_with_features_are_scored() {
        let model = Scripted::new(vec![1, 3]);
        let mut report = RunReport::new("S7test");

        let out = classify_records(
            vec![record(Some(0.3), Some(40.0)), record(None, Some(40.0)), record(Some(0.99), Some(10.0))],
            &model,
            &mut report,
        )
        .unwrap();

        assert_eq!(*model.seen.borrow(), vec![[0.3, 40.0], [0.99, 10.0]]);
        assert_eq!(out[0].dream_type, Some(DreamType::Sunny));
        assert_eq!(out[1].dream_type, None);
        assert_eq!(out[2].dream_type, Some(DreamType::Rainy));
        assert_eq!(out[2].raw_dream_type, Some(DreamType::Rainy));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_count_mismatch_is_reported() {
        let model = Scripted::new(vec![0]);
        let mut report = RunReport::new("S7test");

        let out = classify_records(
            vec![record(Some(0.3), Some(40.0)), record(Some(0.5), Some(60.0))],
            &model,
            &mut report,
        )
        .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].dream_type, Some(DreamType::Dry));
        assert_eq!(out[1].dream_type, None);
        assert_eq!(
            report.warnings,
            vec![IntegrityWarning::PredictionCountMismatch {
                expected: 2,
                received: 1
            }]
        );
    }

    #[test]
    fn test_unknown_class_leaves_label_unset() {
        let model = Scripted::new(vec![7]);
        let mut report = RunReport::new("S7test");

        let out = classify_records(vec![record(Some(0.3), Some(40.0))], &model, &mut report).unwrap();
        assert_eq!(out[0].dream_type, None);
        assert_eq!(
            report.warnings,
            vec![IntegrityWarning::UnknownClassIndex { index: 7, rows: 1 }]
        );
    }

    #[test]
    fn test_no_features_skips_the_model() {
        let model = Scripted::new(vec![1]);
        let mut report = RunReport::new("S7test");

        let out = classify_records(vec![record(None, Some(40.0))], &model, &mut report).unwrap();
        assert!(model.seen.borrow().is_empty());
        assert_eq!(out[0].dream_type, None);
        assert!(report.warnings.is_empty());
    }
}
