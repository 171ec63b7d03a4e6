//! Notebook command handlers

use crate::cli::NotebookCommand;
use crate::commands::history::truncate_title;
use crate::config::Config;
use crate::error::{MyIqError, Result};
use crate::notebook::{default_export_name, export, render_html};
use crate::session::NotebookSession;
use crate::storage::{NotebookStore, SessionStore};
use anyhow::Context;
use colored::Colorize;
use prettytable::{format, Table};
use std::path::{Path, PathBuf};

/// Handle notebook commands
pub fn handle_notebook(config: &Config, command: NotebookCommand) -> Result<()> {
    let store = NotebookStore::open(&config.data_dir()?, config.storage.notebook_on_corrupt)?;

    match command {
        NotebookCommand::New {
            title,
            content,
            file,
        } => {
            let content = read_content(content, file.as_deref())?.unwrap_or_default();
            let title = match title.trim() {
                "" => NotebookSession::default().title,
                t => t.to_string(),
            };
            let mut notebook = NotebookSession::new(title, content);
            store.save(&mut notebook)?;
            println!(
                "{}",
                format!("Created notebook {} \"{}\"", notebook.id, notebook.title).green()
            );
        }
        NotebookCommand::List => {
            let notebooks = store.load_all()?;
            if notebooks.is_empty() {
                println!("{}", "No notebooks found.".yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
            table.add_row(prettytable::row![
                "ID".bold(),
                "Title".bold(),
                "Chars".bold(),
                "Last Updated".bold()
            ]);
            for nb in notebooks {
                let updated = nb
                    .updated_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string();
                table.add_row(prettytable::row![
                    nb.id.cyan(),
                    truncate_title(&nb.title, 40),
                    nb.content.chars().count(),
                    updated
                ]);
            }
            println!("\nNotebooks:");
            table.printstd();
            println!();
        }
        NotebookCommand::Show { id, html } => {
            let notebook = load_notebook(&store, &id)?;
            if html {
                print!("{}", render_html(&notebook.title, &notebook.content));
            } else {
                println!("{}", notebook.content);
            }
        }
        NotebookCommand::Edit { id, content, file } => {
            let content = read_content(content, file.as_deref())?
                .ok_or_else(|| MyIqError::InvalidInput("no content given".into()))?;
            let notebook = store.update_content(&id, &content)?;
            println!("{}", format!("Saved notebook {}", notebook.id).green());
        }
        NotebookCommand::Rename { id, title } => {
            let notebook = store.rename(&id, &title)?;
            println!(
                "{}",
                format!("Renamed {} to \"{}\"", notebook.id, notebook.title).green()
            );
        }
        NotebookCommand::Delete { id } => {
            if store.load(&id)?.is_none() {
                println!("{}", format!("No notebook {}", id).yellow());
                return Ok(());
            }
            store.delete(&id)?;
            println!("{}", format!("Deleted notebook {}", id).green());
        }
        NotebookCommand::Export { id, format, output } => {
            let notebook = load_notebook(&store, &id)?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(default_export_name(&notebook, format.extension()))
            });
            export(&notebook, format, &path)?;
            println!("{}", format!("Exported to {}", path.display()).green());
        }
    }

    Ok(())
}

fn load_notebook(store: &NotebookStore, id: &str) -> Result<NotebookSession> {
    store
        .load(id)?
        .ok_or_else(|| MyIqError::NotFound(format!("notebook {}", id)).into())
}

fn read_content(content: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    match (content, file) {
        (Some(c), _) => Ok(Some(c)),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => Ok(None),
    }
}
