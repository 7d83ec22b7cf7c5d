//! Engine configuration.
//!
//! Everything the host application supplies to the engine: the work window
//! used by availability search, the default buffer, the recurrence series
//! length, the reminder cadence, and the external catalogs (event-type
//! taxonomy, timezone list). Loaded from JSON; every field has a default.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::convert::parse_timezone;
use crate::dst::DstPolicy;
use crate::error::{Result, ScheduleError};
use crate::event::DEFAULT_BUFFER_MINUTES;

/// The daily interval searched for free slots, in the draft's local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub step_minutes: u32,
    pub max_slots: usize,
}

impl Default for WorkWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            step_minutes: 30,
            max_slots: 6,
        }
    }
}

/// One entry of the externally supplied event-type taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub value: String,
    pub label: String,
}

impl EventType {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub work_window: WorkWindow,
    pub default_buffer_minutes: u32,
    /// Occurrences generated after the base event of a recurring series.
    pub series_length: u32,
    pub reminder_interval_secs: u64,
    pub dst_policy: DstPolicy,
    /// Accepted `event_type` values. Empty accepts any type.
    pub event_types: Vec<EventType>,
    /// Timezones offered to users.
    pub timezones: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            work_window: WorkWindow::default(),
            default_buffer_minutes: DEFAULT_BUFFER_MINUTES,
            series_length: 5,
            reminder_interval_secs: 30,
            dst_policy: DstPolicy::default(),
            event_types: Vec::new(),
            timezones: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| ScheduleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ScheduleError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let window = &self.work_window;
        if window.start >= window.end {
            return Err(ScheduleError::Config(format!(
                "work window start {} must be before end {}",
                window.start, window.end
            )));
        }
        if window.step_minutes == 0 {
            return Err(ScheduleError::Config(
                "work window step must be at least one minute".to_string(),
            ));
        }
        if self.reminder_interval_secs == 0 {
            return Err(ScheduleError::Config(
                "reminder interval must be at least one second".to_string(),
            ));
        }
        for tz in &self.timezones {
            parse_timezone(tz)
                .map_err(|_| ScheduleError::Config(format!("unknown timezone in catalog: {}", tz)))?;
        }
        Ok(())
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs)
    }

    /// Whether `value` belongs to the configured taxonomy.
    pub fn accepts_event_type(&self, value: &str) -> bool {
        self.event_types.is_empty() || self.event_types.iter().any(|t| t.value == value)
    }
}
