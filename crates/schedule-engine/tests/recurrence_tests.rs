//! Tests for recurrence expansion.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use schedule_engine::recurrence::{expand_with_length, SERIES_LENGTH};
use schedule_engine::{expand, Event, EventDraft, EventId, Repeat, ScheduleError};

fn base(date: NaiveDate, tz: &str) -> Event {
    let mut draft = EventDraft::new("Team sync", date, NaiveTime::from_hms_opt(9, 0, 0).unwrap())
        .with_duration(45)
        .with_buffer(10)
        .with_timezone(tz)
        .with_reminder(15)
        .with_event_type("meeting");
    draft.attendees = vec!["ana".to_string(), "bo".to_string(), "ana".to_string()];
    draft.location = "Zoom".to_string();
    draft.description = "Weekly planning".to_string();
    draft.into_event(EventId::new(), 15).unwrap()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn none_produces_no_occurrences() {
    let b = base(ymd(2024, 1, 1), "UTC");
    assert!(expand(&b, Repeat::None).unwrap().is_empty());
}

#[test]
fn weekly_produces_five_occurrences_one_week_apart() {
    let b = base(ymd(2024, 1, 1), "UTC");

    let series = expand(&b, Repeat::Weekly).unwrap();

    assert_eq!(series.len(), SERIES_LENGTH as usize);
    for (i, occurrence) in series.iter().enumerate() {
        let weeks = i as i64 + 1;
        assert_eq!(occurrence.date, b.date + Duration::weeks(weeks));
        assert_eq!(occurrence.date.weekday(), b.date.weekday());
        assert_eq!(occurrence.time, b.time);
        assert_ne!(occurrence.id, b.id);
    }

    let ids: HashSet<EventId> = series.iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), series.len(), "occurrence ids must be distinct");
}

#[test]
fn occurrences_copy_everything_but_date_and_id() {
    let b = base(ymd(2024, 1, 1), "UTC");

    for occurrence in expand(&b, Repeat::Daily).unwrap() {
        let normalized = Event {
            id: b.id,
            date: b.date,
            ..occurrence
        };
        assert_eq!(normalized, b);
    }
}

#[test]
fn daily_crosses_year_end() {
    let b = base(ymd(2024, 12, 29), "UTC");

    let dates: Vec<NaiveDate> = expand(&b, Repeat::Daily)
        .unwrap()
        .into_iter()
        .map(|e| e.date)
        .collect();

    assert_eq!(
        dates,
        vec![
            ymd(2024, 12, 30),
            ymd(2024, 12, 31),
            ymd(2025, 1, 1),
            ymd(2025, 1, 2),
            ymd(2025, 1, 3),
        ]
    );
}

#[test]
fn monthly_clamps_day_thirty_in_non_leap_year() {
    let b = base(ymd(2025, 1, 30), "UTC");

    let dates: Vec<NaiveDate> = expand(&b, Repeat::Monthly)
        .unwrap()
        .into_iter()
        .map(|e| e.date)
        .collect();

    assert_eq!(
        dates,
        vec![
            ymd(2025, 2, 28),
            ymd(2025, 3, 30),
            ymd(2025, 4, 30),
            ymd(2025, 5, 30),
            ymd(2025, 6, 30),
        ]
    );
}

#[test]
fn monthly_mid_month_keeps_day() {
    let b = base(ymd(2024, 10, 15), "UTC");

    let dates: Vec<NaiveDate> = expand(&b, Repeat::Monthly)
        .unwrap()
        .into_iter()
        .map(|e| e.date)
        .collect();

    assert_eq!(
        dates,
        vec![
            ymd(2024, 11, 15),
            ymd(2024, 12, 15),
            ymd(2025, 1, 15),
            ymd(2025, 2, 15),
            ymd(2025, 3, 15),
        ]
    );
}

#[test]
fn weekly_series_keeps_wall_clock_across_dst() {
    // 2026-03-02 09:00 EST; DST starts 2026-03-08 in New York.
    let b = base(ymd(2026, 3, 2), "America/New_York");

    let series = expand(&b, Repeat::Weekly).unwrap();

    assert_eq!(
        b.start().unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap()
    );
    // 09:00 EDT = 13:00 UTC
    assert_eq!(
        series[0].start().unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 9, 13, 0, 0).unwrap()
    );
}

#[test]
fn custom_series_length() {
    let b = base(ymd(2024, 1, 1), "UTC");
    assert_eq!(expand_with_length(&b, Repeat::Daily, 3).unwrap().len(), 3);
    assert!(expand_with_length(&b, Repeat::Daily, 0).unwrap().is_empty());
}

#[test]
fn unknown_timezone_rejected() {
    let mut b = base(ymd(2024, 1, 1), "UTC");
    b.timezone = "Atlantis/Capital".to_string();

    let err = expand(&b, Repeat::Weekly).unwrap_err();
    assert_eq!(err, ScheduleError::InvalidTimezone("Atlantis/Capital".to_string()));
}
