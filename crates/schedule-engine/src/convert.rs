//! Wall-clock to instant conversion.
//!
//! Every instant in the engine comes from a `(date, time, timezone)` triple
//! resolved here. The offset applied is the one the IANA database says was in
//! force on that date, so the same wall-clock time maps to different UTC
//! instants on either side of a DST transition.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::dst::DstPolicy;
use crate::error::{Result, ScheduleError};

/// How far before a nonexistent local time to look for the pre-transition offset.
const GAP_PROBE_HOURS: i64 = 6;

/// Parse an IANA timezone identifier.
pub fn parse_timezone(timezone: &str) -> Result<Tz> {
    timezone
        .parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimezone(timezone.to_string()))
}

/// Resolve a wall-clock `date` + `time` in `timezone` to an absolute instant,
/// shifting times inside a DST gap forward.
///
/// # Errors
/// Returns `ScheduleError::InvalidTimezone` if `timezone` is not a known IANA identifier.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
/// use schedule_engine::convert::resolve_instant;
///
/// let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
/// let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// // July is EDT (UTC-4)
/// let instant = resolve_instant(date, time, "America/New_York").unwrap();
/// assert_eq!(instant, Utc.with_ymd_and_hms(2026, 7, 1, 13, 0, 0).unwrap());
/// ```
pub fn resolve_instant(date: NaiveDate, time: NaiveTime, timezone: &str) -> Result<DateTime<Utc>> {
    resolve_instant_with_policy(date, time, timezone, DstPolicy::default())
}

/// Like [`resolve_instant`], with an explicit policy for nonexistent local times.
///
/// Ambiguous local times resolve to the earlier of the two instants.
pub fn resolve_instant_with_policy(
    date: NaiveDate,
    time: NaiveTime,
    timezone: &str,
    policy: DstPolicy,
) -> Result<DateTime<Utc>> {
    let tz = parse_timezone(timezone)?;
    let naive = date.and_time(time);

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let nonexistent = || ScheduleError::NonexistentLocalTime {
                date,
                time,
                timezone: timezone.to_string(),
            };
            match policy {
                DstPolicy::Reject => Err(nonexistent()),
                DstPolicy::ShiftForward => shift_past_gap(&tz, naive).ok_or_else(nonexistent),
            }
        }
    }
}

/// Convert an instant back to the wall clock of `timezone`.
pub fn local_date_time(instant: DateTime<Utc>, timezone: &str) -> Result<NaiveDateTime> {
    let tz = parse_timezone(timezone)?;
    Ok(instant.with_timezone(&tz).naive_local())
}

/// Interpret `naive` with the offset in force just before the gap.
fn shift_past_gap(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    let before = tz
        .from_local_datetime(&(naive - Duration::hours(GAP_PROBE_HOURS)))
        .earliest()?;
    let offset_secs = i64::from(before.offset().fix().local_minus_utc());
    Some(Utc.from_utc_datetime(&(naive - Duration::seconds(offset_secs))))
}
