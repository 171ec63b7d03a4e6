//! Chat history store
//!
//! All chat sessions live in one aggregate file, `chat_history/sessions.json`,
//! holding a mapping of session id to session. Every save or delete rewrites
//! the entire mapping, which is fine at household scale.

use super::{
    ensure_dir, read_json, sort_summaries, write_json, CorruptionPolicy, SessionStore,
    SessionSummary, CHAT_DIR,
};
use crate::error::{MyIqError, Result};
use crate::session::ChatSession;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the aggregate file inside the chat history directory
pub const SESSIONS_FILE: &str = "sessions.json";

type SessionMap = BTreeMap<String, ChatSession>;

/// Aggregate-file store for chat sessions
#[derive(Debug, Clone)]
pub struct ChatHistoryStore {
    sessions_file: PathBuf,
    policy: CorruptionPolicy,
}

impl ChatHistoryStore {
    /// Open (creating if needed) the chat history directory under `root`
    ///
    /// # Examples
    ///
    /// ```
    /// use myiq::storage::{ChatHistoryStore, CorruptionPolicy, SessionStore};
    ///
    /// let dir = std::env::temp_dir().join("myiq-doc-chat");
    /// let store = ChatHistoryStore::open(&dir, CorruptionPolicy::Recover).unwrap();
    /// assert!(store.load("missing").unwrap().is_none());
    /// ```
    pub fn open(root: &Path, policy: CorruptionPolicy) -> Result<Self> {
        let dir = ensure_dir(root, CHAT_DIR)?;
        Ok(Self {
            sessions_file: dir.join(SESSIONS_FILE),
            policy,
        })
    }

    /// Path of the aggregate file
    pub fn path(&self) -> &Path {
        &self.sessions_file
    }

    /// Every stored session keyed by id
    pub fn load_all(&self) -> Result<BTreeMap<String, ChatSession>> {
        Ok(read_json::<SessionMap>(&self.sessions_file, self.policy)?.unwrap_or_default())
    }

    /// Change a session's title and persist it
    ///
    /// # Errors
    ///
    /// Returns `MyIqError::InvalidInput` for a blank title and
    /// `MyIqError::NotFound` for an unknown id
    pub fn rename(&self, id: &str, title: &str) -> Result<ChatSession> {
        let title = title.trim();
        if title.is_empty() {
            return Err(MyIqError::InvalidInput("title cannot be empty".into()).into());
        }
        let mut session = self
            .load(id)?
            .ok_or_else(|| MyIqError::NotFound(format!("chat session {}", id)))?;
        session.title = title.to_string();
        self.save(&mut session)?;
        Ok(session)
    }
}

impl SessionStore for ChatHistoryStore {
    type Record = ChatSession;

    fn load(&self, id: &str) -> Result<Option<ChatSession>> {
        Ok(self.load_all()?.remove(id))
    }

    fn save(&self, session: &mut ChatSession) -> Result<()> {
        session.touch();
        let mut sessions = self.load_all()?;
        sessions.insert(session.id.clone(), session.clone());
        write_json(&self.sessions_file, &sessions)?;
        tracing::debug!(
            session_id = %session.id,
            messages = session.messages.len(),
            "Saved chat session"
        );
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut sessions = self.load_all()?;
        if sessions.remove(id).is_some() {
            write_json(&self.sessions_file, &sessions)?;
            tracing::info!(session_id = %id, "Deleted chat session");
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<SessionSummary>> {
        let mut summaries: Vec<SessionSummary> = self
            .load_all()?
            .into_values()
            .map(|s| SessionSummary {
                id: s.id,
                title: s.title,
                updated_at: s.updated_at,
            })
            .collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }
}
