//! Chat command handler
//!
//! With `--prompt`, sends one message, waits for the reply and prints it.
//! Otherwise runs an interactive loop. Line editing happens on a dedicated
//! thread so the loop can print replies as they arrive while the user keeps
//! typing; each reply is saved to the session it was sent from, even after
//! `/new` or `/switch`.

use crate::chat::{ChatReply, ChatService};
use crate::commands::history::{print_message, truncate_title};
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::config::Config;
use crate::error::Result;
use crate::extract::{parse_file, UNSUPPORTED};
use crate::providers::{self, LlmClient};
use crate::session::{Attachment, ChatSession, Message};
use crate::storage::{ChatHistoryStore, SessionStore};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Start a chat, interactive unless `prompt` is given
///
/// # Examples
///
/// ```no_run
/// use myiq::commands::chat::run_chat;
/// use myiq::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// run_chat(Config::default(), None, None, vec![], Some("Hello".into())).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_chat(
    config: Config,
    resume: Option<String>,
    title: Option<String>,
    attach: Vec<std::path::PathBuf>,
    prompt: Option<String>,
) -> Result<()> {
    let store = ChatHistoryStore::open(&config.data_dir()?, config.storage.chat_on_corrupt)?;
    let client: Arc<dyn LlmClient> = Arc::from(providers::create_client(&config.llm)?);
    let model = client.model();
    let mut service = ChatService::new(store, client, &config.chat);

    let mut session = match resume {
        Some(id) => service.open_session(&id)?,
        None => service.new_session(title.as_deref()),
    };
    let attachments: Vec<Attachment> = attach.iter().map(|p| attach_file(p)).collect();

    if let Some(prompt) = prompt {
        tracing::info!(session_id = %session.id, "Sending one-shot message");
        let reply = service.ask(&mut session, &prompt, attachments).await?;
        println!("{}", reply);
        eprintln!("{}", format!("session {}", session.id).dimmed());
        return Ok(());
    }

    tracing::info!("Starting interactive chat mode");
    print_welcome_banner(&model, &session);
    let mut state = ChatState {
        service,
        session,
        attachments,
    };
    state.run().await
}

/// Extract a file into an attachment
///
/// Extraction problems are recorded in the attachment content rather than
/// reported as errors.
pub fn attach_file(path: &Path) -> Attachment {
    Attachment::new(path.display().to_string(), parse_file(path))
}

fn is_extraction_failure(content: &str) -> bool {
    content == UNSUPPORTED || content.starts_with("[Error parsing file:")
}

enum InputEvent {
    Line(String),
    Interrupted,
    Eof,
}

/// Run readline on its own thread
///
/// After delivering a line the thread waits for an acknowledgement before
/// drawing the next prompt, so command output is not interleaved with it.
fn spawn_reader() -> (mpsc::UnboundedReceiver<InputEvent>, std::sync::mpsc::Sender<()>) {
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    let (ack_tx, ack_rx) = std::sync::mpsc::channel::<()>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize line editor: {}", e);
                let _ = line_tx.send(InputEvent::Eof);
                return;
            }
        };

        loop {
            let event = match rl.readline("you> ") {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    InputEvent::Line(line)
                }
                Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
                Err(ReadlineError::Eof) => {
                    let _ = line_tx.send(InputEvent::Eof);
                    break;
                }
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    let _ = line_tx.send(InputEvent::Eof);
                    break;
                }
            };
            if line_tx.send(event).is_err() || ack_rx.recv().is_err() {
                break;
            }
        }
    });

    (line_rx, ack_tx)
}

struct ChatState {
    service: ChatService,
    session: ChatSession,
    attachments: Vec<Attachment>,
}

impl ChatState {
    async fn run(&mut self) -> Result<()> {
        let (mut input_rx, ack_tx) = spawn_reader();

        loop {
            tokio::select! {
                event = input_rx.recv() => match event {
                    Some(InputEvent::Line(line)) => {
                        let keep_going = self.handle_line(&line).unwrap_or_else(|e| {
                            eprintln!("{}", format!("Error: {:#}", e).red());
                            true
                        });
                        if !keep_going {
                            break;
                        }
                        let _ = ack_tx.send(());
                    }
                    Some(InputEvent::Interrupted) => {
                        println!("Type /exit to leave chat.");
                        let _ = ack_tx.send(());
                    }
                    Some(InputEvent::Eof) | None => break,
                },
                result = self.service.complete_next(), if self.service.pending() > 0 => {
                    match result {
                        Ok(Some((reply, updated))) => self.show_reply(&reply, updated),
                        Ok(None) => {}
                        Err(e) => eprintln!("{}", format!("Failed to save reply: {:#}", e).red()),
                    }
                }
            }
        }

        drop(ack_tx);
        let pending = self.service.pending();
        if pending > 0 {
            let noun = if pending == 1 { "reply" } else { "replies" };
            println!("{}", format!("Waiting for {} pending {}...", pending, noun).dimmed());
            while let Some((reply, updated)) = self.service.complete_next().await? {
                self.show_reply(&reply, updated);
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Handle one input line; returns `false` when the user exits
    fn handle_line(&mut self, line: &str) -> Result<bool> {
        let command = match parse_special_command(line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                return Ok(true);
            }
        };

        match command {
            SpecialCommand::Help => print_help(),
            SpecialCommand::Attach(path) => {
                let attachment = attach_file(Path::new(&path));
                if is_extraction_failure(&attachment.content) {
                    let warning = format!("{}: {}", attachment.file_name(), attachment.content);
                    println!("{}", warning.yellow());
                } else {
                    println!(
                        "📎 Attached {} ({} chars)",
                        attachment.file_name(),
                        attachment.content.chars().count()
                    );
                }
                self.attachments.push(attachment);
            }
            SpecialCommand::ListAttachments => {
                if self.attachments.is_empty() {
                    println!("No pending attachments.");
                }
                for a in &self.attachments {
                    println!("📎 {}  {}", a.file_name(), a.path.dimmed());
                }
            }
            SpecialCommand::ClearAttachments => {
                self.attachments.clear();
                println!("Attachments cleared.");
            }
            SpecialCommand::NewSession(title) => {
                self.session = self.service.new_session(title.as_deref());
                println!("{}", format!("Started \"{}\"", self.session.title).green());
            }
            SpecialCommand::ListSessions => self.list_sessions()?,
            SpecialCommand::Switch(id) => {
                self.session = self.service.open_session(&id)?;
                println!(
                    "{}",
                    format!(
                        "Switched to \"{}\" ({} messages)",
                        self.session.title,
                        self.session.messages.len()
                    )
                    .green()
                );
            }
            SpecialCommand::Rename(title) => {
                if self.service.store().load(&self.session.id)?.is_some() {
                    self.session = self.service.store().rename(&self.session.id, &title)?;
                } else {
                    self.session.title = title.trim().to_string();
                }
                println!("{}", format!("Renamed to \"{}\"", self.session.title).green());
            }
            SpecialCommand::History => {
                if self.session.messages.is_empty() {
                    println!("{}", "(no messages)".dimmed());
                }
                for message in &self.session.messages {
                    print_message(message);
                }
            }
            SpecialCommand::Exit => return Ok(false),
            SpecialCommand::None => {
                if line.trim().is_empty() && self.attachments.is_empty() {
                    return Ok(true);
                }
                let attachments = std::mem::take(&mut self.attachments);
                self.service.send(&mut self.session, line, attachments)?;
                println!("{}", "(thinking...)".dimmed());
            }
        }

        Ok(true)
    }

    fn list_sessions(&self) -> Result<()> {
        let summaries = self.service.store().list()?;
        if summaries.is_empty() {
            println!("No saved sessions.");
        }
        for s in summaries {
            let marker = if s.id == self.session.id { "*" } else { " " };
            println!(
                "{} {}  {}",
                marker,
                s.id.cyan(),
                truncate_title(&s.title, 50)
            );
        }
        Ok(())
    }

    fn show_reply(&mut self, reply: &ChatReply, updated: Option<ChatSession>) {
        if reply.session_id != self.session.id {
            let title = updated.map(|s| s.title).unwrap_or_else(|| reply.session_id.clone());
            println!("{}", format!("[reply saved to \"{}\"]", title).dimmed());
            return;
        }
        match updated {
            Some(session) => {
                if let Some(message) = session.messages.last() {
                    println!();
                    print_message(message);
                }
                self.session = session;
            }
            None => print_message(&Message::assistant(reply.text.clone())),
        }
    }
}

fn print_welcome_banner(model: &str, session: &ChatSession) {
    println!();
    println!("{}", "MyIQ Chat".bold());
    println!("Model:   {}", model.cyan());
    println!("Session: {} {}", session.title, session.id.dimmed());
    if !session.messages.is_empty() {
        println!("{} earlier messages, /history to show them", session.messages.len());
    }
    println!("Type /help for commands, /exit to leave.");
    println!();
}
