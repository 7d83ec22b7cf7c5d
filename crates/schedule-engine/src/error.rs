//! Error types for schedule-engine operations.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::event::EventId;

/// A draft was rejected before any conflict detection ran.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,

    #[error("date is required")]
    MissingDate,

    #[error("time is required")]
    MissingTime,

    #[error("duration must be at least one minute")]
    ZeroDuration,

    #[error("unknown event type: {0}")]
    UnknownEventType(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Conflicts with: {}", titles.join(", "))]
    Conflict { titles: Vec<String> },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local time {date} {time} does not exist in {timezone}")]
    NonexistentLocalTime {
        date: NaiveDate,
        time: NaiveTime,
        timezone: String,
    },

    #[error("Event not found: {0}")]
    NotFound(EventId),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
