//! Reminder evaluation.
//!
//! [`ReminderScheduler::tick`] is called periodically with the current instant
//! and a snapshot of the events. An event with `reminder_minutes > 0` becomes
//! due once `now` reaches `start - reminder_minutes` and stays due until it
//! starts. Each `(event id, remind_at)` pair fires at most once; fired
//! notifications accumulate until dismissed with that exact pair. A dismissed
//! pair does not fire again; it is forgotten once its event has started.
//!
//! Editing an event so that its `remind_at` moves does not retract a
//! notification that already fired for the old instant, and deleting an event
//! leaves its notifications in place.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::convert::local_date_time;
use crate::event::{Event, EventId};

/// Identity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReminderKey {
    pub event_id: EventId,
    pub remind_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderNotification {
    pub event_id: EventId,
    pub remind_at: DateTime<Utc>,
    pub starts_at: DateTime<Utc>,
    pub message: String,
    /// The event as it was when the notification fired.
    pub event: Event,
}

impl ReminderNotification {
    pub fn key(&self) -> ReminderKey {
        ReminderKey {
            event_id: self.event_id,
            remind_at: self.remind_at,
        }
    }
}

/// Owns the list of fired, not yet dismissed notifications.
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    fired: Vec<ReminderNotification>,
    /// Dismissed keys and the start of their event.
    dismissed: HashMap<ReminderKey, DateTime<Utc>>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit notifications for every event whose reminder is due at `now`.
    ///
    /// Returns only the notifications created by this call; calling again with
    /// the same `now` and events returns nothing. Events whose start cannot be
    /// resolved are skipped.
    pub fn tick(&mut self, now: DateTime<Utc>, events: &[Event]) -> Vec<ReminderNotification> {
        self.dismissed.retain(|_, starts_at| now < *starts_at);
        let mut emitted = Vec::new();

        for event in events {
            if event.reminder_minutes == 0 {
                continue;
            }

            let (start, remind_at) = match (event.start(), event.remind_at()) {
                (Ok(start), Ok(Some(remind_at))) => (start, remind_at),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(event_id = %event.id, error = %e, "skipping reminder");
                    continue;
                }
                (Ok(_), Ok(None)) => continue,
            };

            if now < remind_at || now >= start {
                continue;
            }

            let key = ReminderKey {
                event_id: event.id,
                remind_at,
            };
            if self.contains(&key) || self.dismissed.contains_key(&key) {
                continue;
            }

            let notification = ReminderNotification {
                event_id: event.id,
                remind_at,
                starts_at: start,
                message: reminder_message(event, start),
                event: event.clone(),
            };
            info!(
                event_id = %event.id,
                remind_at = %remind_at,
                "reminder fired"
            );
            self.fired.push(notification.clone());
            emitted.push(notification);
        }

        emitted
    }

    /// Remove the notification with exactly this key. Returns whether one existed.
    pub fn dismiss(&mut self, event_id: EventId, remind_at: DateTime<Utc>) -> bool {
        let key = ReminderKey {
            event_id,
            remind_at,
        };
        let Some(index) = self.fired.iter().position(|n| n.key() == key) else {
            return false;
        };
        let removed = self.fired.remove(index);
        self.dismissed.insert(key, removed.starts_at);
        true
    }

    pub fn contains(&self, key: &ReminderKey) -> bool {
        self.fired.iter().any(|n| n.key() == *key)
    }

    /// Fired notifications in emission order.
    pub fn notifications(&self) -> &[ReminderNotification] {
        &self.fired
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}

fn reminder_message(event: &Event, start: DateTime<Utc>) -> String {
    let at = local_date_time(start, &event.timezone)
        .map(|local| local.format("%H:%M").to_string())
        .unwrap_or_else(|_| event.time.format("%H:%M").to_string());
    format!(
        "Reminder: {} starts in {} minutes at {}",
        event.title, event.reminder_minutes, at
    )
}
