use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::{MyIqError, Result};
use crate::session::Message;
use crate::storage::{ChatHistoryStore, SessionStore};
use colored::Colorize;
use prettytable::{format, Table};

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let store = ChatHistoryStore::open(&config.data_dir()?, config.storage.chat_on_corrupt)?;

    match command {
        HistoryCommand::List => {
            let sessions = store.load_all()?;
            let summaries = store.list()?;

            if summaries.is_empty() {
                println!("{}", "No chat history found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Messages".bold(),
                "Last Updated".bold()
            ]);

            for summary in summaries {
                let count = sessions
                    .get(&summary.id)
                    .map(|s| s.messages.len())
                    .unwrap_or(0);
                let updated = summary
                    .updated_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string();
                table.add_row(prettytable::row![
                    summary.id.cyan(),
                    truncate_title(&summary.title, 40),
                    count,
                    updated
                ]);
            }

            println!("\nChat History:");
            table.printstd();
            println!();
            println!("Use {} to resume a session.", "myiq chat --resume <ID>".cyan());
            println!();
        }
        HistoryCommand::Show { id } => {
            let session = store
                .load(&id)?
                .ok_or_else(|| MyIqError::NotFound(format!("chat session {}", id)))?;

            println!("\n{}\n", session.title.bold());
            if session.messages.is_empty() {
                println!("{}", "(no messages)".dimmed());
            }
            for message in &session.messages {
                print_message(message);
            }
        }
        HistoryCommand::Rename { id, title } => {
            let session = store.rename(&id, &title)?;
            println!(
                "{}",
                format!("Renamed {} to \"{}\"", session.id, session.title).green()
            );
        }
        HistoryCommand::Delete { id } => {
            if store.load(&id)?.is_none() {
                println!("{}", format!("No chat session {}", id).yellow());
                return Ok(());
            }
            store.delete(&id)?;
            println!("{}", format!("Deleted chat session {}", id).green());
        }
    }

    Ok(())
}

/// Print one chat message with a role header
pub fn print_message(message: &Message) {
    let time = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M");
    if message.is_user {
        println!("{} {}", "You".cyan().bold(), time.to_string().dimmed());
        println!("{}\n", message.text);
    } else if crate::providers::is_error_reply(&message.text) {
        println!("{} {}", "Assistant".green().bold(), time.to_string().dimmed());
        println!("{}\n", message.text.red());
    } else {
        println!("{} {}", "Assistant".green().bold(), time.to_string().dimmed());
        println!("{}\n", message.text);
    }
}

/// Shorten a title for table display without splitting characters
pub fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() > max {
        let kept: String = title.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        title.to_string()
    }
}
