//! Calendar command handlers

use crate::cli::CalendarCommand;
use crate::config::Config;
use crate::error::{MyIqError, Result};
use crate::storage::{parse_date, CalendarEvent, CalendarStore};
use colored::Colorize;

/// Handle calendar commands
pub fn handle_calendar(config: &Config, command: CalendarCommand) -> Result<()> {
    let store = CalendarStore::open(&config.data_dir()?, config.storage.calendar_on_corrupt)?;

    match command {
        CalendarCommand::List { date } => {
            let date = parse_date(&date)?;
            let events = store.events_for_date(date)?;
            println!("{}", date.format("%A, %B %-d, %Y").to_string().bold());
            if events.is_empty() {
                println!("{}", "No events.".yellow());
            }
            for (i, event) in events.iter().enumerate() {
                println!("{:>3}. {}  {}", i + 1, event.text, event.id.dimmed());
            }
        }
        CalendarCommand::Add { date, text } => {
            let date = parse_date(&date)?;
            let event = store.add_event(date, &text)?;
            println!("{}", format!("Added event {} on {}", event.id, date).green());
        }
        CalendarCommand::Edit { date, event, text } => {
            let date = parse_date(&date)?;
            let events = store.events_for_date(date)?;
            let index = resolve_event(&events, &event)?;
            let updated = store.edit_event_at(date, index, &text)?;
            println!(
                "{}",
                format!("Updated event on {}: {}", date, updated.text).green()
            );
        }
        CalendarCommand::Delete { date, event } => {
            let date = parse_date(&date)?;
            let events = store.events_for_date(date)?;
            let index = resolve_event(&events, &event)?;
            if !store.delete_event_at(date, index)? {
                return Err(MyIqError::NotFound(format!("event {} on {}", event, date)).into());
            }
            println!(
                "{}",
                format!("Deleted event on {}: {}", date, events[index].text).green()
            );
        }
        CalendarCommand::Dates => {
            let dates = store.dates_with_events()?;
            if dates.is_empty() {
                println!("{}", "No events scheduled.".yellow());
            }
            for date in dates {
                let count = store.events_for_date(date)?.len();
                println!("{}  ({} event{})", date, count, if count == 1 { "" } else { "s" });
            }
        }
    }

    Ok(())
}

/// Position of an event given its id or its 1-based position in the list
pub fn resolve_event(events: &[CalendarEvent], raw: &str) -> Result<usize> {
    let raw = raw.trim();
    if let Some(index) = events.iter().position(|e| e.id == raw) {
        return Ok(index);
    }
    raw.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|&i| i < events.len())
        .ok_or_else(|| MyIqError::NotFound(format!("event {}", raw)).into())
}
