//! `schedule` CLI: conflict checks, free slots, recurrence and reminders over
//! a JSON event file.
//!
//! ## Usage
//!
//! ```sh
//! # Free 60-minute slots on a date (events from stdin)
//! cat events.json | schedule availability --date 2024-01-01 --duration 60
//!
//! # Which events would a 10:30 meeting collide with?
//! schedule conflicts -i events.json --date 2024-01-01 --time 10:30 --duration 45
//!
//! # Dates of a monthly series
//! schedule expand --title "1:1" --date 2024-01-31 --time 09:00 --repeat monthly
//!
//! # Reminders due at an instant
//! schedule remind -i events.json --now 2024-01-01T08:50:00Z
//!
//! # Custom work window / buffer / taxonomy
//! schedule --config engine.json availability -i events.json --date 2024-01-01
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` (default `warn`).

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use schedule_engine::event::parse_wall_clock;
use schedule_engine::recurrence::expand_with_length;
use schedule_engine::{
    find_conflicts, find_slots, EngineConfig, Event, EventDraft, EventId, ReminderScheduler, Repeat,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "schedule",
    version,
    about = "Conflict checks, free slots, recurrence and reminders for a calendar timeline"
)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List conflict-free start times inside the work window
    Availability {
        /// Events file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        date: NaiveDate,
        /// Meeting length in minutes
        #[arg(long, default_value_t = 60)]
        duration: u32,
        /// Buffer after the meeting in minutes (configured default if omitted)
        #[arg(long)]
        buffer: Option<u32>,
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
    /// List existing events a proposed meeting would collide with
    Conflicts {
        /// Events file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[arg(long)]
        date: NaiveDate,
        /// Start time, HH:MM
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
        #[arg(long, default_value_t = 60)]
        duration: u32,
        #[arg(long)]
        buffer: Option<u32>,
        #[arg(long, default_value = "UTC")]
        timezone: String,
        /// Ignore this event id (when rescheduling an existing event)
        #[arg(long)]
        exclude: Option<EventId>,
    },
    /// Print the dates of a recurring series, base first
    Expand {
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: NaiveDate,
        /// Start time, HH:MM
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
        /// none, daily, weekly or monthly
        #[arg(long)]
        repeat: Repeat,
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
    /// Print reminders due at an instant
    Remind {
        /// Events file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// RFC 3339 instant, e.g. 2024-01-01T08:50:00Z
        #[arg(long)]
        now: DateTime<Utc>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Availability {
            input,
            date,
            duration,
            buffer,
            timezone,
        } => {
            let events = read_events(input.as_deref())?;
            let draft = request_draft(duration, buffer, timezone);
            let slots = find_slots(date, &draft, &events, &config)
                .context("Failed to compute availability")?;
            for slot in slots {
                println!("{}", slot.format("%H:%M"));
            }
        }
        Commands::Conflicts {
            input,
            date,
            time,
            duration,
            buffer,
            timezone,
            exclude,
        } => {
            let events = read_events(input.as_deref())?;
            let candidate = EventDraft {
                title: "candidate".to_string(),
                date: Some(date),
                time: Some(time),
                ..request_draft(duration, buffer, timezone)
            }
            .into_event(EventId::new(), config.default_buffer_minutes)?;

            let conflicts = find_conflicts(&candidate, &events, exclude)
                .context("Failed to check conflicts")?;
            if conflicts.is_empty() {
                println!("No conflicts");
            }
            for conflict in conflicts {
                println!("{}\t{} min", conflict.title, conflict.overlap_minutes);
            }
        }
        Commands::Expand {
            title,
            date,
            time,
            repeat,
            timezone,
        } => {
            let base = EventDraft::new(title, date, time)
                .with_timezone(timezone)
                .with_repeat(repeat)
                .into_event(EventId::new(), config.default_buffer_minutes)?;
            let series = expand_with_length(&base, repeat, config.series_length)
                .context("Failed to expand series")?;

            for event in std::iter::once(&base).chain(series.iter()) {
                println!("{} {}", event.date, event.time.format("%H:%M"));
            }
        }
        Commands::Remind { input, now } => {
            let events = read_events(input.as_deref())?;
            let mut scheduler = ReminderScheduler::new();
            for notification in scheduler.tick(now, &events) {
                println!("{}", notification.message);
            }
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_time(s: &str) -> std::result::Result<NaiveTime, String> {
    parse_wall_clock(s).ok_or_else(|| format!("invalid time '{}', expected HH:MM", s))
}

/// A draft carrying only what slot and conflict checks need.
fn request_draft(duration: u32, buffer: Option<u32>, timezone: String) -> EventDraft {
    EventDraft {
        duration_minutes: duration,
        buffer_minutes: buffer,
        timezone,
        ..EventDraft::default()
    }
}

fn read_events(path: Option<&str>) -> Result<Vec<Event>> {
    let json = read_input(path)?;
    let events: Vec<Event> =
        serde_json::from_str(&json).context("Failed to parse events JSON")?;
    debug!(count = events.len(), "events loaded");
    Ok(events)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
