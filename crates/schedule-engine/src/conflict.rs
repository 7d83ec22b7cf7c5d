//! Detect events whose conflict windows overlap a candidate.
//!
//! An event's conflict window is `[start, start + duration + buffer)`.
//! Adjacent windows (where one ends exactly when another starts) are NOT conflicts.

use tracing::debug;

use crate::error::Result;
use crate::event::{Event, EventId, TimeWindow};

/// An existing event that collides with a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub event_id: EventId,
    pub title: String,
    pub overlap_minutes: i64,
}

/// Find every event in `existing` whose conflict window overlaps `candidate`'s.
///
/// The candidate itself (same id) and `exclude` are skipped, which lets an
/// edited event be checked against the store it already lives in.
/// Results follow the iteration order of `existing`.
///
/// # Errors
/// Returns `ScheduleError::InvalidTimezone` if the candidate or an existing
/// event carries an unknown timezone.
pub fn find_conflicts(
    candidate: &Event,
    existing: &[Event],
    exclude: Option<EventId>,
) -> Result<Vec<Conflict>> {
    let window = candidate.conflict_window()?;
    find_window_conflicts(
        &window,
        existing
            .iter()
            .filter(|e| e.id != candidate.id && Some(e.id) != exclude),
    )
}

/// Find every event whose conflict window overlaps `window`.
pub fn find_window_conflicts<'a>(
    window: &TimeWindow,
    existing: impl IntoIterator<Item = &'a Event>,
) -> Result<Vec<Conflict>> {
    let mut conflicts = Vec::new();

    for other in existing {
        let other_window = other.conflict_window()?;
        if window.overlaps(&other_window) {
            debug!(
                conflict_with = %other.id,
                title = %other.title,
                "conflict window overlap"
            );
            conflicts.push(Conflict {
                event_id: other.id,
                title: other.title.clone(),
                overlap_minutes: window.overlap_minutes(&other_window),
            });
        }
    }

    Ok(conflicts)
}

/// Titles of the given conflicts, in order.
pub fn conflict_titles(conflicts: &[Conflict]) -> Vec<String> {
    conflicts.iter().map(|c| c.title.clone()).collect()
}
