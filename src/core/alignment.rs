//! Nearest-timestamp join of the moisture stream onto the light stream.
//!
//! Each moisture event produces exactly one [`AlignedRecord`]. The light
//! reading closest in time (earlier or later) is attached when it lies
//! within the tolerance; otherwise the light fields stay empty.
//!
//! Tie-break: when an earlier and a later reading are equally distant, the
//! earlier one wins. Among duplicate light timestamps the last one in input
//! order is chosen on the earlier side and the first one on the later side.

use crate::core::record::AlignedRecord;
use crate::ingest::types::{LightEvent, MoistureEvent};
use chrono::{Duration, NaiveDateTime};

/// Default maximum distance between a moisture event and its light reading.
pub const DEFAULT_TOLERANCE_SECS: i64 = 60;

/// Join each moisture event to its nearest light reading within `tolerance`.
///
/// Both inputs are sorted stably by timestamp first, so output order is
/// ascending by timestamp with ties kept in input order.
pub fn align_nearest(
    mut moisture: Vec<MoistureEvent>,
    mut light: Vec<LightEvent>,
    tolerance: Duration,
) -> Vec<AlignedRecord> {
    moisture.sort_by_key(|e| e.timestamp);
    light.sort_by_key(|e| e.timestamp);

    moisture
        .into_iter()
        .map(|event| {
            let matched = nearest_within(&light, event.timestamp, tolerance);
            let mut record = AlignedRecord::new(event.device_id, event.timestamp, event.avg_moisture);
            record.source = event.source;
            if let Some(reading) = matched {
                record.light_timestamp = Some(reading.timestamp);
                record.lux = reading.lux;
            }
            record
        })
        .collect()
}

/// Find the reading nearest to `at` in a slice sorted by timestamp.
pub fn nearest_within(
    sorted: &[LightEvent],
    at: NaiveDateTime,
    tolerance: Duration,
) -> Option<&LightEvent> {
    // First reading strictly after `at`
    let after = sorted.partition_point(|e| e.timestamp <= at);
    let earlier = after.checked_sub(1).map(|i| &sorted[i]);
    let later = sorted.get(after);

    let nearest = match (earlier, later) {
        (Some(e), Some(l)) => {
            if l.timestamp - at < at - e.timestamp {
                l
            } else {
                e
            }
        }
        (Some(e), None) => e,
        (None, Some(l)) => l,
        (None, None) => return None,
    };

    (distance(nearest.timestamp, at) <= tolerance).then_some(nearest)
}

fn distance(a: NaiveDateTime, b: NaiveDateTime) -> Duration {
    if a >= b {
        a - b
    } else {
        b - a
    }
}
