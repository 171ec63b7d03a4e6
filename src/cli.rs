//! Command-line interface definition for MyIQ
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for chat, history, notebooks, the calendar and models.

use crate::notebook::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MyIQ - local LLM chat, notebooks and calendar
///
/// Chat with a local Ollama model, keep markdown notebooks and track
/// day-by-day events. Everything is stored as JSON under the data directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "myiq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for MyIQ
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Chat with the model (interactive unless --prompt is given)
    Chat {
        /// Resume an existing chat session by id
        #[arg(short, long)]
        resume: Option<String>,

        /// Title for a new session
        #[arg(short, long, conflicts_with = "resume")]
        title: Option<String>,

        /// Attach a file to the first message (repeatable)
        #[arg(short, long = "attach")]
        attach: Vec<PathBuf>,

        /// Send a single message, print the reply and exit
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Manage chat history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Manage markdown notebooks
    Notebook {
        #[command(subcommand)]
        command: NotebookCommand,
    },

    /// Manage calendar events
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },

    /// Inspect available models
    Models {
        /// Model subcommand
        #[command(subcommand)]
        command: ModelCommand,
    },
}

/// Chat history subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List chat sessions, most recent first
    List,

    /// Print every message of a session
    Show {
        /// Session id
        id: String,
    },

    /// Change a session's title
    Rename {
        /// Session id
        id: String,
        /// New title
        title: String,
    },

    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },
}

/// Notebook subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum NotebookCommand {
    /// Create a notebook
    New {
        /// Notebook title
        #[arg(default_value = "Untitled")]
        title: String,

        /// Initial markdown content
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,

        /// Read initial content from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// List notebooks, most recent first
    List,

    /// Print a notebook
    Show {
        /// Notebook id
        id: String,

        /// Render as HTML instead of raw markdown
        #[arg(long)]
        html: bool,
    },

    /// Replace a notebook's content
    Edit {
        /// Notebook id
        id: String,

        /// New markdown content
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        content: Option<String>,

        /// Read new content from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Change a notebook's title
    Rename {
        /// Notebook id
        id: String,
        /// New title
        title: String,
    },

    /// Delete a notebook
    Delete {
        /// Notebook id
        id: String,
    },

    /// Export a notebook to a file
    Export {
        /// Notebook id
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "html")]
        format: ExportFormat,

        /// Output path (defaults to "<title>.<ext>" in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Calendar subcommands
///
/// `EVENT` arguments accept either an event id or the 1-based position shown
/// by `calendar list`.
#[derive(Subcommand, Debug, Clone)]
pub enum CalendarCommand {
    /// List events for a date (YYYY-MM-DD)
    List {
        /// Date (YYYY-MM-DD)
        date: String,
    },

    /// Add an event to a date
    Add {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Event text
        text: String,
    },

    /// Replace an event's text
    Edit {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Event id or 1-based index
        event: String,
        /// New event text
        text: String,
    },

    /// Remove an event
    Delete {
        /// Date (YYYY-MM-DD)
        date: String,
        /// Event id or 1-based index
        event: String,
    },

    /// List dates that have events
    Dates,
}

/// Model subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ModelCommand {
    /// List models installed on the Ollama server
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configured model
    Current,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            data_dir: None,
            command: Commands::Models {
                command: ModelCommand::Current,
            },
        }
    }
}
