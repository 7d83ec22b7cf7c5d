//! # schedule-engine
//!
//! Scheduling engine for a single calendar timeline.
//!
//! Resolves wall-clock event times to instants with DST-correct offsets via
//! `chrono-tz`, rejects events whose buffered windows overlap, proposes free
//! start times inside a work window, expands recurring events with the `rrule`
//! crate, and emits deduplicated reminders ahead of event start.
//!
//! ## Modules
//!
//! - [`convert`]: `(date, time, timezone)` → absolute instant
//! - [`dst`]: policy for wall-clock times inside a DST gap
//! - [`event`]: events, drafts, and conflict windows
//! - [`conflict`]: detect events whose conflict windows overlap a candidate
//! - [`availability`]: greedy free-slot search in the work window
//! - [`recurrence`]: expand a base event into a bounded series
//! - [`reminder`]: periodic reminder evaluation and dismissal
//! - [`store`]: the event store and its add/edit/delete commands
//! - [`runtime`]: shared calendar handle and the periodic reminder task
//! - [`config`]: engine configuration
//! - [`error`]: Error types

pub mod availability;
pub mod config;
pub mod conflict;
pub mod convert;
pub mod dst;
pub mod error;
pub mod event;
pub mod recurrence;
pub mod reminder;
pub mod runtime;
pub mod store;

pub use availability::find_slots;
pub use config::{EngineConfig, EventType, WorkWindow};
pub use conflict::{find_conflicts, Conflict};
pub use convert::resolve_instant;
pub use dst::DstPolicy;
pub use error::{ScheduleError, ValidationError};
pub use event::{Event, EventDraft, EventId, EventStatus, LocationKind, Repeat, TimeWindow};
pub use recurrence::expand;
pub use reminder::{ReminderKey, ReminderNotification, ReminderScheduler};
pub use runtime::{Calendar, Clock, ReminderTask, SystemClock, MIN_TICK_INTERVAL};
pub use store::EventStore;
