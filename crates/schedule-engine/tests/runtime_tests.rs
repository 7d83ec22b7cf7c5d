//! Tests for the shared calendar handle and the periodic reminder task.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use schedule_engine::{
    Calendar, Clock, EngineConfig, EventDraft, EventStore, ScheduleError, MIN_TICK_INTERVAL,
};

/// A clock frozen at one instant.
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
}

fn draft(title: &str, hour: u32, reminder: u32) -> EventDraft {
    EventDraft::new(
        title,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
    )
    .with_reminder(reminder)
}

#[tokio::test]
async fn commands_go_through_shared_handle() {
    let calendar = Calendar::new(EventStore::default());
    let other = calendar.clone();

    let id = calendar.add_event(draft("Standup", 10, 15)).await.unwrap()[0];
    let err = other.add_event(draft("Clash", 10, 0)).await.unwrap_err();
    assert!(matches!(err, ScheduleError::Conflict { .. }));

    other.edit_event(id, draft("Standup (late)", 11, 15)).await.unwrap();
    let events = calendar.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Standup (late)");

    calendar.delete_event(id).await.unwrap();
    assert!(other.events().await.is_empty());
}

#[tokio::test]
async fn tick_broadcasts_new_notifications() {
    let calendar = Calendar::new(EventStore::default());
    let mut rx = calendar.subscribe();
    let id = calendar.add_event(draft("Standup", 10, 15)).await.unwrap()[0];

    let fired = calendar.tick(at(9, 50)).await;
    assert_eq!(fired.len(), 1);
    assert!(calendar.tick(at(9, 50)).await.is_empty());

    let received = rx.recv().await.unwrap();
    assert_eq!(received.event_id, id);

    assert_eq!(calendar.notifications().await.len(), 1);
    assert!(calendar.dismiss_reminder(id, at(9, 45)).await);
    assert!(calendar.notifications().await.is_empty());
}

#[tokio::test]
async fn deleting_event_keeps_fired_reminder() {
    let calendar = Calendar::new(EventStore::default());
    let id = calendar.add_event(draft("Standup", 10, 15)).await.unwrap()[0];
    calendar.tick(at(9, 46)).await;

    calendar.delete_event(id).await.unwrap();

    let remaining = calendar.notifications().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].event_id, id);
}

#[tokio::test]
async fn reminder_task_ticks_until_stopped() {
    let calendar = Calendar::new(EventStore::default());
    calendar.add_event(draft("Standup", 10, 15)).await.unwrap();
    calendar.add_event(draft("Review", 14, 30)).await.unwrap();
    let mut rx = calendar.subscribe();

    let task = calendar.spawn_reminders_every(FixedClock(at(9, 55)), Duration::from_millis(10));

    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("reminder should arrive")
        .unwrap();
    assert_eq!(first.event.title, "Standup");

    // Several more ticks at the same instant add nothing.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calendar.notifications().await.len(), 1);

    task.stop().await;
}

#[tokio::test]
async fn task_runs_until_stopped() {
    let calendar = Calendar::new(EventStore::default());
    let task = schedule_engine::ReminderTask::spawn(
        calendar.clone(),
        Arc::new(FixedClock(at(8, 0))),
        Duration::from_millis(5),
    );
    assert!(!task.is_finished());

    task.stop().await;
}

#[tokio::test]
async fn calendar_uses_configured_reminder_interval() {
    let config = EngineConfig {
        reminder_interval_secs: 3600,
        ..EngineConfig::default()
    };
    let calendar = Calendar::new(EventStore::new(config));
    assert_eq!(calendar.reminder_interval(), Duration::from_secs(3600));
    assert_eq!(
        Calendar::new(EventStore::default()).reminder_interval(),
        Duration::from_secs(30)
    );

    calendar.add_event(draft("Standup", 10, 15)).await.unwrap();
    let mut rx = calendar.subscribe();
    let task = calendar.spawn_reminders(FixedClock(at(9, 55)));

    // The first tick is immediate.
    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("reminder should arrive")
        .unwrap();
    assert_eq!(first.event.title, "Standup");

    // Due now, but the next tick is an hour away.
    calendar.add_event(draft("Review", 12, 150)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calendar.notifications().await.len(), 1);

    task.stop().await;
}

#[tokio::test]
async fn zero_interval_is_raised_to_minimum() {
    let calendar = Calendar::new(EventStore::default());
    calendar.add_event(draft("Standup", 10, 15)).await.unwrap();
    let mut rx = calendar.subscribe();

    let task = calendar.spawn_reminders_every(FixedClock(at(9, 55)), Duration::ZERO);

    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("reminder should arrive")
        .unwrap();
    assert_eq!(first.event.title, "Standup");
    assert!(MIN_TICK_INTERVAL > Duration::ZERO);

    task.stop().await;
}
