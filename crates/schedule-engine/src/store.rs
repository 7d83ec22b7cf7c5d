//! The event store and its command/query API.
//!
//! All mutation of the timeline goes through [`EventStore::add_event`],
//! [`EventStore::edit_event`] and [`EventStore::delete_event`]. Each command
//! computes everything it needs before touching the collection, so a rejected
//! command leaves the store exactly as it was.
//!
//! Only the base of a recurring series is conflict-checked; the generated
//! occurrences are inserted without their own check.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info};

use crate::availability::find_slots;
use crate::config::EngineConfig;
use crate::conflict::{conflict_titles, find_conflicts};
use crate::convert::resolve_instant_with_policy;
use crate::error::{Result, ScheduleError, ValidationError};
use crate::event::{Event, EventDraft, EventId};
use crate::recurrence::expand_with_length;

/// Callback invoked with the base event after a successful add.
pub type OnAdded = Box<dyn Fn(&Event) + Send + Sync>;

/// Ordered, id-keyed collection of events. Insertion order is preserved.
pub struct EventStore {
    config: EngineConfig,
    events: Vec<Event>,
    on_added: Option<OnAdded>,
}

impl fmt::Debug for EventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStore")
            .field("config", &self.config)
            .field("events", &self.events)
            .field("on_added", &self.on_added.is_some())
            .finish()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EventStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
            on_added: None,
        }
    }

    /// Register the callback run after each successful [`add_event`](Self::add_event).
    pub fn with_on_added(mut self, callback: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.on_added = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Add an event, and its recurrence series when `draft.repeat` is not `None`.
    ///
    /// Returns the ids of all inserted events, base first.
    ///
    /// # Errors
    /// - `Validation` when title, date or time is missing (no conflict check is attempted);
    /// - `InvalidTimezone` / `NonexistentLocalTime` when the start cannot be resolved;
    /// - `Conflict` with every conflicting title.
    pub fn add_event(&mut self, draft: EventDraft) -> Result<Vec<EventId>> {
        let repeat = draft.repeat;
        let base = self.admit(draft, EventId::new())?;

        let conflicts = find_conflicts(&base, &self.events, None)?;
        if !conflicts.is_empty() {
            debug!(title = %base.title, count = conflicts.len(), "add rejected");
            return Err(ScheduleError::Conflict {
                titles: conflict_titles(&conflicts),
            });
        }

        let series = expand_with_length(&base, repeat, self.config.series_length)?;

        let mut ids = Vec::with_capacity(series.len() + 1);
        ids.push(base.id);
        ids.extend(series.iter().map(|e| e.id));

        info!(
            event_id = %base.id,
            title = %base.title,
            occurrences = series.len(),
            "event added"
        );

        self.events.push(base.clone());
        self.events.extend(series);

        if let Some(callback) = &self.on_added {
            callback(&base);
        }

        Ok(ids)
    }

    /// Replace the event `id` with `draft`, keeping the id.
    ///
    /// The event being edited is excluded from the conflict check. Editing does
    /// not generate a new recurrence series.
    pub fn edit_event(&mut self, id: EventId, draft: EventDraft) -> Result<()> {
        let index = self.position(id).ok_or(ScheduleError::NotFound(id))?;
        let updated = self.admit(draft, id)?;

        let conflicts = find_conflicts(&updated, &self.events, Some(id))?;
        if !conflicts.is_empty() {
            debug!(event_id = %id, count = conflicts.len(), "edit rejected");
            return Err(ScheduleError::Conflict {
                titles: conflict_titles(&conflicts),
            });
        }

        info!(event_id = %id, title = %updated.title, "event edited");
        self.events[index] = updated;
        Ok(())
    }

    /// Remove the event `id` and return it.
    pub fn delete_event(&mut self, id: EventId) -> Result<Event> {
        let index = self.position(id).ok_or(ScheduleError::NotFound(id))?;
        let removed = self.events.remove(index);
        info!(event_id = %id, title = %removed.title, "event deleted");
        Ok(removed)
    }

    /// Conflict-free start times for `draft` on `date`. Read-only.
    pub fn compute_availability(&self, date: NaiveDate, draft: &EventDraft) -> Result<Vec<NaiveTime>> {
        find_slots(date, draft, &self.events, &self.config)
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// All events in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn position(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }

    /// Validate and normalize a draft into an event with `id`.
    fn admit(&self, draft: EventDraft, id: EventId) -> Result<Event> {
        let event = draft.into_event(id, self.config.default_buffer_minutes)?;
        if !self.config.accepts_event_type(&event.event_type) {
            return Err(ValidationError::UnknownEventType(event.event_type).into());
        }
        resolve_instant_with_policy(event.date, event.time, &event.timezone, self.config.dst_policy)?;
        Ok(event)
    }
}
