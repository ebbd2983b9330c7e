//! Preference-aware overrides of the model's label.
//!
//! Two rules, checked in order, first match wins:
//!
//! 1. A bright-light lover's `sunny` becomes `misty` when light is below 30.
//! 2. A plant that needs frequent water is `dry` when moisture is below 0.4,
//!    whatever the model said.
//!
//! A single application is the contract. Re-applying is stable except when
//! rule 1 fired on a row that also satisfies rule 2: the second pass turns
//! that `misty` into `dry`.

use crate::core::record::{AlignedRecord, DreamType, Preferences};
use crate::diagnostics::RunReport;

/// Light percentage below which a bright-light lover's sunny label is dropped.
pub const DIM_LIGHT_THRESHOLD: f64 = 30.0;

/// Moisture below which a thirsty plant is always dry.
pub const DRY_SOIL_THRESHOLD: f64 = 0.4;

/// Which override fired for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    DimLight,
    DrySoil,
}

/// Apply the override rules to one label.
pub fn adjust_dream_type(
    label: Option<DreamType>,
    light_level: Option<f64>,
    avg_moisture: Option<f64>,
    preferences: Preferences,
) -> (Option<DreamType>, Option<Override>) {
    let dim = light_level.is_some_and(|light| light < DIM_LIGHT_THRESHOLD);
    if preferences.likes_bright_light && dim && label == Some(DreamType::Sunny) {
        return (Some(DreamType::Misty), Some(Override::DimLight));
    }

    let dry = avg_moisture.is_some_and(|m| m < DRY_SOIL_THRESHOLD);
    if preferences.needs_frequent_water && dry {
        return (Some(DreamType::Dry), Some(Override::DrySoil));
    }

    (label, None)
}

/// Apply overrides to every record using its effective preferences.
pub fn apply_preferences(records: Vec<AlignedRecord>, report: &mut RunReport) -> Vec<AlignedRecord> {
    records
        .into_iter()
        .map(|record| {
            let (dream_type, applied) = adjust_dream_type(
                record.dream_type,
                record.light_level,
                record.avg_moisture,
                record.preferences,
            );
            match applied {
                Some(Override::DimLight) => report.overrides.dim_light += 1,
                Some(Override::DrySoil) => report.overrides.dry_soil += 1,
                None => {}
            }
            AlignedRecord { dream_type, ..record }
        })
        .collect()
}
