//! Shared calendar handle and the periodic reminder task.
//!
//! [`Calendar`] wraps an [`EventStore`] and a [`ReminderScheduler`] for use
//! from several tasks. Commands take the store's write lock for their whole
//! duration; the reminder path copies the event list under a read lock and
//! evaluates the copy, so it never sees a half-applied command.
//!
//! [`ReminderTask`] drives [`Calendar::tick`] on a fixed interval until
//! [`ReminderTask::stop`] is called.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::event::{Event, EventDraft, EventId};
use crate::reminder::{ReminderNotification, ReminderScheduler};
use crate::store::EventStore;

/// Capacity of the reminder broadcast channel.
const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

/// Shortest period a [`ReminderTask`] ticks at.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Source of "now" for the reminder task.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Cloneable handle to a shared event store and its reminders.
#[derive(Clone)]
pub struct Calendar {
    store: Arc<RwLock<EventStore>>,
    reminders: Arc<Mutex<ReminderScheduler>>,
    notify_tx: broadcast::Sender<ReminderNotification>,
    reminder_interval: Duration,
}

impl Calendar {
    pub fn new(store: EventStore) -> Self {
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        let reminder_interval = store.config().reminder_interval();
        Self {
            store: Arc::new(RwLock::new(store)),
            reminders: Arc::new(Mutex::new(ReminderScheduler::new())),
            notify_tx,
            reminder_interval,
        }
    }

    /// Cadence of [`spawn_reminders`](Self::spawn_reminders), from the store's config.
    pub fn reminder_interval(&self) -> Duration {
        self.reminder_interval
    }

    pub async fn add_event(&self, draft: EventDraft) -> Result<Vec<EventId>> {
        self.store.write().await.add_event(draft)
    }

    pub async fn edit_event(&self, id: EventId, draft: EventDraft) -> Result<()> {
        self.store.write().await.edit_event(id, draft)
    }

    pub async fn delete_event(&self, id: EventId) -> Result<Event> {
        self.store.write().await.delete_event(id)
    }

    pub async fn compute_availability(
        &self,
        date: NaiveDate,
        draft: &EventDraft,
    ) -> Result<Vec<NaiveTime>> {
        self.store.read().await.compute_availability(date, draft)
    }

    /// Snapshot of all events.
    pub async fn events(&self) -> Vec<Event> {
        self.store.read().await.events().to_vec()
    }

    /// Evaluate reminders at `now` and broadcast the new ones.
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<ReminderNotification> {
        let snapshot = self.events().await;
        let emitted = self.reminders.lock().await.tick(now, &snapshot);

        for notification in &emitted {
            // No subscribers is not an error.
            let _ = self.notify_tx.send(notification.clone());
        }
        emitted
    }

    pub async fn dismiss_reminder(&self, event_id: EventId, remind_at: DateTime<Utc>) -> bool {
        self.reminders.lock().await.dismiss(event_id, remind_at)
    }

    /// Fired, undismissed notifications.
    pub async fn notifications(&self) -> Vec<ReminderNotification> {
        self.reminders.lock().await.notifications().to_vec()
    }

    /// Receive every notification emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ReminderNotification> {
        self.notify_tx.subscribe()
    }

    /// Start a [`ReminderTask`] at the configured reminder interval.
    pub fn spawn_reminders(&self, clock: impl Clock) -> ReminderTask {
        self.spawn_reminders_every(clock, self.reminder_interval)
    }

    /// Start a [`ReminderTask`] ticking this calendar every `every`.
    pub fn spawn_reminders_every(&self, clock: impl Clock, every: Duration) -> ReminderTask {
        ReminderTask::spawn(self.clone(), Arc::new(clock), every)
    }
}

/// Periodic reminder evaluation running on the tokio runtime.
pub struct ReminderTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ReminderTask {
    /// Periods below [`MIN_TICK_INTERVAL`] are raised to it.
    pub fn spawn(calendar: Calendar, clock: Arc<dyn Clock>, every: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let every = every.max(MIN_TICK_INTERVAL);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval = ?every, "reminder task started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let fired = calendar.tick(clock.now()).await;
                        if !fired.is_empty() {
                            debug!(count = fired.len(), "reminders emitted");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        // A dropped sender also ends the task.
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("reminder task stopped");
        });

        Self { shutdown, handle }
    }

    /// Signal the task to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "reminder task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
