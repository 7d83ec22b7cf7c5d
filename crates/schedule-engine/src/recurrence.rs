//! Recurrence expansion: a base event plus a frequency yields a bounded series
//! of concrete occurrences.
//!
//! Occurrence dates come from RFC 5545 rules evaluated by the `rrule` crate.
//! Only the calendar date is taken from the rule; each occurrence keeps the
//! base's wall-clock time and timezone, so DST is applied per occurrence when
//! its start instant is resolved.

use chrono::{Datelike, NaiveDate};
use rrule::RRuleSet;

use crate::convert::parse_timezone;
use crate::error::{Result, ScheduleError};
use crate::event::{Event, EventId, Repeat};

/// Number of occurrences generated after the base event.
pub const SERIES_LENGTH: u32 = 5;

/// Days of month at or below which every month has a matching day.
const ALWAYS_PRESENT_MONTH_DAY: u32 = 28;

/// Expand `base` into [`SERIES_LENGTH`] future occurrences.
///
/// Returns an empty list for [`Repeat::None`].
pub fn expand(base: &Event, repeat: Repeat) -> Result<Vec<Event>> {
    expand_with_length(base, repeat, SERIES_LENGTH)
}

/// Expand `base` into `count` future occurrences at base + 1..=count units.
///
/// Each occurrence is a copy of `base` with a new date and a fresh id.
/// Monthly series clamp to the last day of shorter months (Jan 31 → Feb 28 →
/// Mar 31).
///
/// # Errors
/// Returns `ScheduleError::InvalidTimezone` if the base timezone is unknown,
/// and `ScheduleError::InvalidRule` if the generated rule is rejected.
pub fn expand_with_length(base: &Event, repeat: Repeat, count: u32) -> Result<Vec<Event>> {
    parse_timezone(&base.timezone)?;

    let dates = occurrence_dates(base.date, repeat, count)?;
    Ok(dates
        .into_iter()
        .map(|date| Event {
            id: EventId::new(),
            date,
            ..base.clone()
        })
        .collect())
}

/// The `count` calendar dates following `start` for the given frequency.
pub fn occurrence_dates(start: NaiveDate, repeat: Repeat, count: u32) -> Result<Vec<NaiveDate>> {
    let Some(freq) = repeat.frequency() else {
        return Ok(Vec::new());
    };
    if count == 0 {
        return Ok(Vec::new());
    }

    // The rule yields DTSTART itself first, hence one extra instance.
    let mut rule = format!("FREQ={};COUNT={}", freq, count.saturating_add(1));
    if repeat == Repeat::Monthly && start.day() > ALWAYS_PRESENT_MONTH_DAY {
        let days: Vec<String> = (ALWAYS_PRESENT_MONTH_DAY..=start.day())
            .map(|d| d.to_string())
            .collect();
        rule.push_str(&format!(";BYMONTHDAY={};BYSETPOS=-1", days.join(",")));
    }

    // Dates only: evaluate on a floating UTC calendar at noon.
    let rrule_text = format!(
        "DTSTART;TZID=UTC:{}T120000\nRRULE:{}",
        start.format("%Y%m%d"),
        rule
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| ScheduleError::InvalidRule(format!("{}", e)))?;

    let limit = u16::try_from(count.saturating_add(1)).unwrap_or(u16::MAX);
    let dates = rrule_set
        .all(limit)
        .dates
        .into_iter()
        .map(|dt| dt.date_naive())
        .filter(|date| *date > start)
        .take(count as usize)
        .collect();

    Ok(dates)
}
