//! Calendar event store
//!
//! Events are grouped by calendar day, one file per date
//! (`calendar_data/2024-05-01.json`). Each event carries a ULID so edits and
//! deletes address a specific event rather than a list position that may
//! have shifted since it was displayed. Files written by older versions hold
//! a plain array of strings; those entries get ids derived from the date and
//! their position, so repeated reads agree until the next write stores them.

use super::{ensure_dir, read_json, remove_if_exists, write_json, CorruptionPolicy, CALENDAR_DIR};
use crate::error::{MyIqError, Result};
use crate::session::deserialize_timestamp;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use ulid::Ulid;

/// A single event note on a calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Stable identifier
    pub id: String,
    /// Event description
    pub text: String,
    /// When the event note was created
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl CalendarEvent {
    /// Create an event with a fresh id
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// On-disk entry: either a legacy bare string or a full event
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEvent {
    Text(String),
    Event(CalendarEvent),
}

impl StoredEvent {
    fn into_event(self, date: NaiveDate, index: usize) -> CalendarEvent {
        match self {
            StoredEvent::Text(text) => {
                let midnight = date.and_time(NaiveTime::default()).and_utc();
                let millis = u64::try_from(midnight.timestamp_millis()).unwrap_or(0);
                CalendarEvent {
                    id: Ulid::from_parts(millis, index as u128).to_string(),
                    text,
                    created_at: midnight,
                }
            }
            StoredEvent::Event(event) => event,
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date
///
/// # Examples
///
/// ```
/// use myiq::storage::calendar::parse_date;
///
/// assert!(parse_date("2024-05-01").is_ok());
/// assert!(parse_date("May 1st").is_err());
/// ```
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        MyIqError::InvalidInput(format!("invalid date {:?} (expected YYYY-MM-DD): {}", raw, e))
            .into()
    })
}

fn clean_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MyIqError::InvalidInput("event text cannot be empty".into()).into());
    }
    Ok(trimmed.to_string())
}

/// Per-date file store for calendar events
#[derive(Debug, Clone)]
pub struct CalendarStore {
    dir: PathBuf,
    policy: CorruptionPolicy,
}

impl CalendarStore {
    /// Open (creating if needed) the calendar directory under `root`
    pub fn open(root: &Path, policy: CorruptionPolicy) -> Result<Self> {
        let dir = ensure_dir(root, CALENDAR_DIR)?;
        Ok(Self { dir, policy })
    }

    /// Directory holding the per-date files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    /// Events recorded for `date`, in insertion order
    pub fn events_for_date(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>> {
        let stored: Option<Vec<StoredEvent>> = read_json(&self.path_for(date), self.policy)?;
        Ok(stored
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, stored)| stored.into_event(date, i))
            .collect())
    }

    /// Replace all events for `date`; an empty list removes the date file
    pub fn save_events_for_date(&self, date: NaiveDate, events: &[CalendarEvent]) -> Result<()> {
        let path = self.path_for(date);
        if events.is_empty() {
            return remove_if_exists(&path);
        }
        write_json(&path, events)
    }

    /// Append an event to `date`
    pub fn add_event(&self, date: NaiveDate, text: &str) -> Result<CalendarEvent> {
        let event = CalendarEvent::new(clean_text(text)?);
        let mut events = self.events_for_date(date)?;
        events.push(event.clone());
        self.save_events_for_date(date, &events)?;
        tracing::info!(%date, event_id = %event.id, "Added calendar event");
        Ok(event)
    }

    /// Replace the text of the event with `id`
    ///
    /// # Errors
    ///
    /// Returns `MyIqError::NotFound` if no event on `date` has that id
    pub fn edit_event(&self, date: NaiveDate, id: &str, text: &str) -> Result<CalendarEvent> {
        let text = clean_text(text)?;
        let mut events = self.events_for_date(date)?;
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| MyIqError::NotFound(format!("event {} on {}", id, date)))?;
        event.text = text;
        let updated = event.clone();
        self.save_events_for_date(date, &events)?;
        Ok(updated)
    }

    /// Remove the event with `id`; returns whether anything was removed
    pub fn delete_event(&self, date: NaiveDate, id: &str) -> Result<bool> {
        let mut events = self.events_for_date(date)?;
        let before = events.len();
        events.retain(|e| e.id != id);
        if events.len() == before {
            return Ok(false);
        }
        self.save_events_for_date(date, &events)?;
        tracing::info!(%date, event_id = %id, "Deleted calendar event");
        Ok(true)
    }

    /// Replace the text of the event at zero-based `index`
    ///
    /// The index is resolved against a fresh read of the date file.
    pub fn edit_event_at(
        &self,
        date: NaiveDate,
        index: usize,
        text: &str,
    ) -> Result<CalendarEvent> {
        let text = clean_text(text)?;
        let mut events = self.events_for_date(date)?;
        let event = events
            .get_mut(index)
            .ok_or_else(|| MyIqError::NotFound(format!("event #{} on {}", index + 1, date)))?;
        event.text = text;
        let updated = event.clone();
        self.save_events_for_date(date, &events)?;
        Ok(updated)
    }

    /// Remove the event at zero-based `index`; out of range is a no-op
    pub fn delete_event_at(&self, date: NaiveDate, index: usize) -> Result<bool> {
        let mut events = self.events_for_date(date)?;
        if index >= events.len() {
            return Ok(false);
        }
        events.remove(index);
        self.save_events_for_date(date, &events)?;
        Ok(true)
    }

    /// Dates that currently have an event file, ascending
    pub fn dates_with_events(&self) -> Result<Vec<NaiveDate>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read {}", self.dir.display()))?;
        let mut dates: Vec<NaiveDate> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                if path.extension().and_then(|x| x.to_str()) != Some("json") {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?.to_string();
                NaiveDate::parse_from_str(&stem, "%Y-%m-%d").ok()
            })
            .collect();
        dates.sort();
        Ok(dates)
    }
}
