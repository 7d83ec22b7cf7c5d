//! Greedy free-slot search inside the daily work window.
//!
//! Walks the work window on a fixed grid (09:00, 09:30, ... by default) in the
//! draft's timezone and keeps every start time whose buffered window is free of
//! conflicts and whose nominal end still fits before the window closes. The
//! scan stops at the first `max_slots` hits: it does not look for the best
//! packing, nor does it look past the grid.

use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::debug;

use crate::config::EngineConfig;
use crate::conflict::find_window_conflicts;
use crate::convert::resolve_instant_with_policy;
use crate::error::{Result, ScheduleError};
use crate::event::{Event, EventDraft, TimeWindow};

/// Find up to `work_window.max_slots` conflict-free start times on `date`.
///
/// Only `duration_minutes`, `buffer_minutes` and `timezone` of `draft` are
/// used; its own date and time are ignored. Grid points that do not exist on
/// a DST transition day are skipped under `DstPolicy::Reject`.
///
/// # Errors
/// Returns `ScheduleError::InvalidTimezone` if the draft or an existing event
/// carries an unknown timezone.
pub fn find_slots(
    date: NaiveDate,
    draft: &EventDraft,
    existing: &[Event],
    config: &EngineConfig,
) -> Result<Vec<NaiveTime>> {
    let window = &config.work_window;
    let policy = config.dst_policy;
    let timezone = draft.timezone.as_str();
    let duration = Duration::minutes(i64::from(draft.duration_minutes));
    let buffer = draft.effective_buffer(config.default_buffer_minutes);

    let window_end = resolve_instant_with_policy(date, window.end, timezone, policy)?;
    let day_end = date.and_time(window.end);
    let step = Duration::minutes(i64::from(window.step_minutes.max(1)));

    let mut slots = Vec::new();
    let mut cursor = date.and_time(window.start);

    while cursor < day_end && slots.len() < window.max_slots {
        let start = match resolve_instant_with_policy(cursor.date(), cursor.time(), timezone, policy) {
            Ok(start) => start,
            Err(ScheduleError::NonexistentLocalTime { .. }) => {
                cursor += step;
                continue;
            }
            Err(e) => return Err(e),
        };

        // Later grid points only end later.
        if start + duration > window_end {
            break;
        }

        let candidate = TimeWindow::new(
            start,
            i64::from(draft.duration_minutes) + i64::from(buffer),
        );
        if find_window_conflicts(&candidate, existing)?.is_empty() {
            slots.push(cursor.time());
        } else {
            debug!(slot = %cursor.time(), "slot rejected: conflict");
        }

        cursor += step;
    }

    Ok(slots)
}
