//! Chat orchestration
//!
//! [`ChatService`] ties the chat history store to the background request
//! runner. Every operation takes an explicit session handle: the user message
//! is saved before dispatch, and each reply is applied to the session loaded
//! by id from the store, so a reply can never land in whichever session
//! happens to be open when it arrives.

pub mod runner;

pub use runner::{ChatReply, ReplyOrdering, RequestRunner};

use crate::config::ChatConfig;
use crate::error::{MyIqError, Result};
use crate::providers::LlmClient;
use crate::session::{Attachment, ChatSession, Message};
use crate::storage::{ChatHistoryStore, SessionStore};
use std::fmt::Write as _;
use std::sync::Arc;

/// Build the composite prompt sent to the LLM
///
/// `prior` is the conversation history to include (already cut to the
/// history window); attachments are appended after the prompt.
///
/// # Examples
///
/// ```
/// use myiq::chat::build_prompt;
/// use myiq::session::Message;
///
/// let prior = vec![Message::user("hi", vec![]), Message::assistant("hello")];
/// let prompt = build_prompt(&prior, "what's the weather", &[]);
/// assert_eq!(
///     prompt,
///     "Conversation History:\nUser: hi\nAssistant: hello\n\nCurrent message: what's the weather"
/// );
/// assert_eq!(build_prompt(&[], "first", &[]), "first");
/// ```
pub fn build_prompt(prior: &[Message], prompt: &str, attachments: &[Attachment]) -> String {
    let mut out = String::new();

    if prior.is_empty() {
        out.push_str(prompt);
    } else {
        out.push_str("Conversation History:\n");
        for message in prior {
            let _ = writeln!(out, "{}: {}", message.role_label(), message.text);
        }
        out.push_str("\nCurrent message: ");
        out.push_str(prompt);
    }

    for attachment in attachments {
        let _ = write!(
            out,
            "\n\nAttached Content ({}):\n{}",
            attachment.file_name(),
            attachment.content
        );
    }

    out
}

/// Text stored and displayed for a user message
///
/// Attachments are listed as `📎 <file name>` lines under the prompt.
pub fn display_text(prompt: &str, attachments: &[Attachment]) -> String {
    let mut lines: Vec<String> = Vec::new();
    if !prompt.is_empty() {
        lines.push(prompt.to_string());
    }
    lines.extend(attachments.iter().map(|a| format!("📎 {}", a.file_name())));
    lines.join("\n")
}

/// Chat front end over the history store and request runner
pub struct ChatService {
    store: ChatHistoryStore,
    runner: RequestRunner,
    history_window: usize,
}

impl ChatService {
    /// Create a service using `client` for every request
    pub fn new(store: ChatHistoryStore, client: Arc<dyn LlmClient>, config: &ChatConfig) -> Self {
        Self {
            store,
            runner: RequestRunner::new(
                client,
                config.max_concurrent_requests,
                config.reply_ordering,
            ),
            history_window: config.history_window,
        }
    }

    /// Underlying history store
    pub fn store(&self) -> &ChatHistoryStore {
        &self.store
    }

    /// Load a persisted session
    pub fn open_session(&self, id: &str) -> Result<ChatSession> {
        self.store
            .load(id)?
            .ok_or_else(|| MyIqError::NotFound(format!("chat session {}", id)).into())
    }

    /// Start a new, not yet persisted session
    ///
    /// The session is written on its first send.
    pub fn new_session(&self, title: Option<&str>) -> ChatSession {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(ChatSession::default_title);
        ChatSession::new(title)
    }

    /// Record a user message and dispatch it
    ///
    /// The message is appended to the stored copy of the session, so replies
    /// saved since `session` was loaded are kept and appear in the history.
    /// `session` is replaced with that copy. Returns the request's sequence
    /// number without waiting for the reply.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the prompt is blank and nothing is
    /// attached, or a storage error if the session cannot be saved.
    pub fn send(
        &mut self,
        session: &mut ChatSession,
        prompt: &str,
        attachments: Vec<Attachment>,
    ) -> Result<u64> {
        let prompt = prompt.trim();
        if prompt.is_empty() && attachments.is_empty() {
            return Err(MyIqError::InvalidInput("message is empty".into()).into());
        }

        if let Some(stored) = self.store.load(&session.id)? {
            *session = stored;
        }

        let composite = build_prompt(
            session.recent_messages(self.history_window),
            prompt,
            &attachments,
        );

        session.add_message(display_text(prompt, &attachments), true, attachments);
        self.store.save(session)?;

        let seq = self.runner.submit(session.id.clone(), composite);
        tracing::info!(session_id = %session.id, seq, "Message sent");
        Ok(seq)
    }

    /// Requests still awaiting a reply
    pub fn pending(&self) -> usize {
        self.runner.pending()
    }

    /// Wait for the next reply without applying it
    pub async fn next_reply(&mut self) -> Option<ChatReply> {
        self.runner.next_reply().await
    }

    /// Append a reply to its session and persist it
    ///
    /// Returns `None` if the session was deleted while the request was in
    /// flight; the reply is dropped in that case.
    pub fn apply_reply(&self, reply: &ChatReply) -> Result<Option<ChatSession>> {
        let Some(mut session) = self.store.load(&reply.session_id)? else {
            tracing::warn!(
                session_id = %reply.session_id,
                seq = reply.seq,
                "Session no longer exists, dropping reply"
            );
            return Ok(None);
        };
        session.push(Message::assistant(reply.text.clone()));
        self.store.save(&mut session)?;
        tracing::debug!(session_id = %session.id, seq = reply.seq, "Reply saved");
        Ok(Some(session))
    }

    /// Wait for the next reply and apply it
    pub async fn complete_next(&mut self) -> Result<Option<(ChatReply, Option<ChatSession>)>> {
        match self.runner.next_reply().await {
            Some(reply) => {
                let session = self.apply_reply(&reply)?;
                Ok(Some((reply, session)))
            }
            None => Ok(None),
        }
    }

    /// Send a message and wait until its reply is saved
    ///
    /// Replies to earlier requests that complete first are applied along the
    /// way. `session` is refreshed from the store on return.
    pub async fn ask(
        &mut self,
        session: &mut ChatSession,
        prompt: &str,
        attachments: Vec<Attachment>,
    ) -> Result<String> {
        let seq = self.send(session, prompt, attachments)?;
        while let Some((reply, updated)) = self.complete_next().await? {
            if let Some(updated) = updated {
                if updated.id == session.id {
                    *session = updated;
                }
            }
            if reply.seq == seq {
                return Ok(reply.text);
            }
        }
        Err(MyIqError::Llm("reply channel closed".into()).into())
    }
}
