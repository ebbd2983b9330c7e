//! Core stages of the dream record pipeline.
//!
//! This module contains, in pipeline order:
//! - Nearest-timestamp alignment of moisture onto light readings
//! - Light normalisation and trailing-window gap filling
//! - Device to plant identity and profile resolution
//! - Raw sensor validation
//! - The classifier adapter
//! - Preference-aware label overrides
//! - Export filtering and record finalisation
//!
//! Each stage consumes an ordered `Vec` of records and returns a new one.

pub mod alignment;
pub mod classify;
pub mod finalize;
pub mod gapfill;
pub mod identity;
pub mod preference;
pub mod record;
pub mod validation;

// Re-export commonly used types
pub use alignment::{align_nearest, nearest_within, DEFAULT_TOLERANCE_SECS};
pub use classify::classify_records;
pub use finalize::{dream_stamp_id, finalize_records};
pub use gapfill::{fill_light_gaps, normalize_lux, GapFillSettings};
pub use identity::{default_device_map, IdentityMapper};
pub use preference::{adjust_dream_type, apply_preferences, Override};
pub use record::{
    AlignedRecord, DreamRecord, DreamType, LightSource, MoodTag, Preferences, SensorStatus,
};
pub use validation::{classify_sensor_status, validate_sensors};
