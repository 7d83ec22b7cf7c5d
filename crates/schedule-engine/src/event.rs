//! Event model: stored events, caller drafts, and conflict windows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::convert::resolve_instant;
use crate::error::{Result, ValidationError};

/// Buffer applied when a draft or stored event does not carry one.
pub const DEFAULT_BUFFER_MINUTES: u32 = 15;

/// Opaque, immutable event identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EventId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Recurrence frequency of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Repeat {
    /// The RFC 5545 `FREQ` value, or `None` for a one-off event.
    pub fn frequency(&self) -> Option<&'static str> {
        match self {
            Repeat::None => None,
            Repeat::Daily => Some("DAILY"),
            Repeat::Weekly => Some("WEEKLY"),
            Repeat::Monthly => Some("MONTHLY"),
        }
    }
}

impl FromStr for Repeat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Repeat::None),
            "daily" => Ok(Repeat::Daily),
            "weekly" => Ok(Repeat::Weekly),
            "monthly" => Ok(Repeat::Monthly),
            other => Err(format!(
                "unknown repeat '{}': expected none, daily, weekly or monthly",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Confirmed,
    Pending,
}

/// Where an event takes place, guessed from its location text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Video,
    Physical,
    Unspecified,
}

const VIDEO_HINTS: &[&str] = &["video", "zoom", "meet.", "teams", "webex", "http"];

impl LocationKind {
    pub fn from_location(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return LocationKind::Unspecified;
        }
        let lower = trimmed.to_lowercase();
        if VIDEO_HINTS.iter().any(|hint| lower.contains(hint)) {
            LocationKind::Video
        } else {
            LocationKind::Physical
        }
    }
}

/// Half-open interval `[start, end)` between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, minutes: i64) -> Self {
        Self {
            start,
            end: start + Duration::minutes(minutes),
        }
    }

    /// Touching windows (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Minutes shared with `other`; zero when the windows do not overlap.
    pub fn overlap_minutes(&self, other: &TimeWindow) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        (self.end.min(other.end) - self.start.max(other.start)).num_minutes()
    }
}

/// A scheduled event on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub date: NaiveDate,
    #[serde(with = "wall_clock")]
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub timezone: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_buffer")]
    pub buffer_minutes: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub reminder_minutes: u32,
    #[serde(default)]
    pub status: EventStatus,
}

fn default_buffer() -> u32 {
    DEFAULT_BUFFER_MINUTES
}

impl Event {
    /// The absolute start instant of this event.
    pub fn start(&self) -> Result<DateTime<Utc>> {
        resolve_instant(self.date, self.time, &self.timezone)
    }

    /// `[start, start + duration)`.
    pub fn span(&self) -> Result<TimeWindow> {
        Ok(TimeWindow::new(
            self.start()?,
            i64::from(self.duration_minutes),
        ))
    }

    /// `[start, start + duration + buffer)`, the interval used for conflict checks.
    pub fn conflict_window(&self) -> Result<TimeWindow> {
        Ok(TimeWindow::new(
            self.start()?,
            i64::from(self.duration_minutes) + i64::from(self.buffer_minutes),
        ))
    }

    /// Instant at which the reminder becomes eligible, if reminders are enabled.
    pub fn remind_at(&self) -> Result<Option<DateTime<Utc>>> {
        if self.reminder_minutes == 0 {
            return Ok(None);
        }
        Ok(Some(
            self.start()? - Duration::minutes(i64::from(self.reminder_minutes)),
        ))
    }

    pub fn location_kind(&self) -> LocationKind {
        LocationKind::from_location(&self.location)
    }
}

/// Caller-supplied event fields, before an id is assigned.
///
/// `date` and `time` are optional so that an incomplete form can be validated;
/// `buffer_minutes` is optional and filled in by [`EventDraft::into_event`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration_minutes: u32,
    pub timezone: String,
    pub event_type: String,
    pub attendees: Vec<String>,
    pub location: String,
    pub buffer_minutes: Option<u32>,
    pub description: String,
    pub repeat: Repeat,
    pub reminder_minutes: u32,
    pub status: EventStatus,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            date: None,
            time: None,
            duration_minutes: 60,
            timezone: "UTC".to_string(),
            event_type: String::new(),
            attendees: Vec::new(),
            location: String::new(),
            buffer_minutes: None,
            description: String::new(),
            repeat: Repeat::None,
            reminder_minutes: 0,
            status: EventStatus::Confirmed,
        }
    }
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            title: title.into(),
            date: Some(date),
            time: Some(time),
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_buffer(mut self, minutes: u32) -> Self {
        self.buffer_minutes = Some(minutes);
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_reminder(mut self, minutes: u32) -> Self {
        self.reminder_minutes = minutes;
        self
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    /// Buffer after normalization.
    pub fn effective_buffer(&self, default_buffer: u32) -> u32 {
        self.buffer_minutes.unwrap_or(default_buffer)
    }

    /// Check required fields, then build an [`Event`] with `id`.
    ///
    /// This is the single place a missing buffer becomes `default_buffer`.
    pub fn into_event(
        self,
        id: EventId,
        default_buffer: u32,
    ) -> std::result::Result<Event, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let date = self.date.ok_or(ValidationError::MissingDate)?;
        let time = self.time.ok_or(ValidationError::MissingTime)?;
        if self.duration_minutes == 0 {
            return Err(ValidationError::ZeroDuration);
        }

        let buffer_minutes = self.effective_buffer(default_buffer);
        Ok(Event {
            id,
            title: self.title,
            date,
            time,
            duration_minutes: self.duration_minutes,
            timezone: self.timezone,
            event_type: self.event_type,
            attendees: self.attendees,
            location: self.location,
            buffer_minutes,
            description: self.description,
            repeat: self.repeat,
            reminder_minutes: self.reminder_minutes,
            status: self.status,
        })
    }
}

/// Parse a wall-clock time written as `HH:MM` or `HH:MM:SS`.
pub fn parse_wall_clock(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Serde adapter writing times as `HH:MM`.
mod wall_clock {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_wall_clock(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_kind_from_substring() {
        assert_eq!(LocationKind::from_location("Zoom room 4"), LocationKind::Video);
        assert_eq!(
            LocationKind::from_location("https://meet.example.com/abc"),
            LocationKind::Video
        );
        assert_eq!(LocationKind::from_location("Room 101"), LocationKind::Physical);
        assert_eq!(LocationKind::from_location("Meeting room B"), LocationKind::Physical);
        assert_eq!(LocationKind::from_location("   "), LocationKind::Unspecified);
    }

    #[test]
    fn draft_without_buffer_gets_default() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let event = EventDraft::new("Standup", date, time)
            .into_event(EventId::new(), DEFAULT_BUFFER_MINUTES)
            .unwrap();
        assert_eq!(event.buffer_minutes, 15);
    }

    #[test]
    fn draft_missing_fields_rejected_in_order() {
        let draft = EventDraft::default();
        assert_eq!(
            draft.clone().into_event(EventId::new(), 15),
            Err(ValidationError::MissingTitle)
        );

        let titled = EventDraft {
            title: "Review".to_string(),
            ..draft
        };
        assert_eq!(
            titled.clone().into_event(EventId::new(), 15),
            Err(ValidationError::MissingDate)
        );

        let dated = EventDraft {
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..titled
        };
        assert_eq!(
            dated.into_event(EventId::new(), 15),
            Err(ValidationError::MissingTime)
        );
    }

    #[test]
    fn event_json_uses_short_times_and_defaults() {
        let json = r#"{
            "id": "6f1c2f0e-8a4b-4c1e-9d2a-0b7e3c5d9f10",
            "title": "Planning",
            "date": "2024-01-01",
            "time": "10:00",
            "duration_minutes": 60,
            "timezone": "UTC"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(event.buffer_minutes, DEFAULT_BUFFER_MINUTES);
        assert_eq!(event.repeat, Repeat::None);

        let out = serde_json::to_value(&event).unwrap();
        assert_eq!(out["time"], "10:00");
        assert_eq!(out["status"], "confirmed");
    }

    #[test]
    fn span_excludes_buffer_and_conflict_window_includes_it() {
        let event = EventDraft::new(
            "E1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
        .with_buffer(15)
        .into_event(EventId::new(), DEFAULT_BUFFER_MINUTES)
        .unwrap();

        let span = event.span().unwrap();
        let window = event.conflict_window().unwrap();
        assert_eq!(window.start, span.start);
        assert_eq!((span.end - span.start).num_minutes(), 60);
        assert_eq!((window.end - window.start).num_minutes(), 75);
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        let start = DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = TimeWindow::new(start, 75);
        let b = TimeWindow::new(a.end, 30);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert_eq!(a.overlap_minutes(&b), 0);
    }
}
