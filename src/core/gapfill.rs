//! Light level normalisation and gap filling.
//!
//! Lux readings become a clipped 0-100 percentage. Rows without a reading
//! take the mean of the measured levels in the trailing window ending at
//! their timestamp, and anything still empty takes a static fallback.

use crate::core::record::{AlignedRecord, LightSource};
use chrono::Duration;
use statrs::statistics::Statistics;

/// Lux value that maps to 100%.
pub const DEFAULT_MAX_LUX: f64 = 1000.0;

/// Trailing window for the rolling mean (in seconds).
pub const DEFAULT_ROLLING_WINDOW_SECS: i64 = 180;

/// Level assigned when the trailing window holds no measurement.
pub const DEFAULT_FALLBACK_LIGHT_LEVEL: f64 = 50.0;

/// Parameters for [`fill_light_gaps`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapFillSettings {
    pub max_lux: f64,
    pub window: Duration,
    pub fallback_level: f64,
}

impl Default for GapFillSettings {
    fn default() -> Self {
        Self {
            max_lux: DEFAULT_MAX_LUX,
            window: Duration::seconds(DEFAULT_ROLLING_WINDOW_SECS),
            fallback_level: DEFAULT_FALLBACK_LIGHT_LEVEL,
        }
    }
}

/// Convert lux into a percentage of `max_lux`, clipped to [0, 100] and
/// rounded to two decimals.
pub fn normalize_lux(lux: f64, max_lux: f64) -> f64 {
    let pct = (lux / max_lux * 100.0).clamp(0.0, 100.0);
    (pct * 100.0).round() / 100.0
}

/// Normalise every row's light level and fill the gaps.
///
/// `records` must be sorted by timestamp. The window for a row at `t`
/// covers `(t - window, t]` and only rows at or before it in sequence;
/// means are taken over measured levels only, so filled values never feed
/// later windows.
pub fn fill_light_gaps(records: Vec<AlignedRecord>, settings: &GapFillSettings) -> Vec<AlignedRecord> {
    debug_assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    let timestamps: Vec<_> = records.iter().map(|r| r.timestamp).collect();
    let measured: Vec<Option<f64>> = records
        .iter()
        .map(|r| {
            r.lux
                .filter(|lux| lux.is_finite())
                .map(|lux| normalize_lux(lux, settings.max_lux))
        })
        .collect();

    // Timestamps are non-decreasing, so the window start only moves forward
    let mut window_start = 0;

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            // A window reaching past the earliest representable time keeps every prior row
            if let Some(cutoff) = record.timestamp.checked_sub_signed(settings.window) {
                while window_start < i && timestamps[window_start] <= cutoff {
                    window_start += 1;
                }
            }

            let (level, source) = match measured[i] {
                Some(level) => (level, LightSource::Measured),
                None => {
                    let window: Vec<f64> = measured[window_start..i].iter().flatten().copied().collect();
                    if window.is_empty() {
                        (settings.fallback_level, LightSource::Fallback)
                    } else {
                        (window.iter().mean(), LightSource::RollingAverage)
                    }
                }
            };

            AlignedRecord {
                light_level: Some(level),
                light_source: Some(source),
                ..record
            }
        })
        .collect()
}
