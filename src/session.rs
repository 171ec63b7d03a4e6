//! Session models for chat conversations and notebook documents
//!
//! A session is a titled, timestamped unit of persisted content. Chat
//! sessions carry an ordered message list; notebook sessions carry a single
//! markdown blob that is overwritten wholesale on save.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Generate a session identifier from the current local time
///
/// Identifiers sort chronologically. Microseconds are included so that
/// sessions created within the same second do not collide.
///
/// # Examples
///
/// ```
/// use myiq::session::new_session_id;
///
/// let id = new_session_id();
/// assert_eq!(id.len(), "20240501_120000_000000".len());
/// ```
pub fn new_session_id() -> String {
    Local::now().format("%Y%m%d_%H%M%S_%6f").to_string()
}

/// A file attached to a user message: source path and extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Attachment {
    /// Path the content was extracted from
    pub path: String,
    /// Extracted (possibly truncated) text, or a sentinel on failure
    pub content: String,
}

impl Attachment {
    /// Create a new attachment
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// File name component of the path, used when labelling the attachment
    pub fn file_name(&self) -> &str {
        std::path::Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }
}

impl From<(String, String)> for Attachment {
    fn from((path, content): (String, String)) -> Self {
        Self { path, content }
    }
}

impl From<Attachment> for (String, String) {
    fn from(a: Attachment) -> Self {
        (a.path, a.content)
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message content
    pub text: String,
    /// True for human input, false for assistant output
    pub is_user: bool,
    /// Creation time
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Attached files, in the order they were added
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Creates a user message with optional attachments
    ///
    /// # Examples
    ///
    /// ```
    /// use myiq::session::Message;
    ///
    /// let msg = Message::user("hi", vec![]);
    /// assert!(msg.is_user);
    /// ```
    pub fn user(text: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
            timestamp: Utc::now(),
            attachments,
        }
    }

    /// Creates an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
            timestamp: Utc::now(),
            attachments: Vec::new(),
        }
    }

    /// Role label used when rendering history into a prompt
    pub fn role_label(&self) -> &'static str {
        if self.is_user {
            "User"
        } else {
            "Assistant"
        }
    }
}

/// A persisted chat conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique identifier
    #[serde(rename = "session_id")]
    pub id: String,
    /// Display title
    pub title: String,
    /// Messages in chronological order
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Creation time
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a session with a timestamp-derived id
    ///
    /// # Examples
    ///
    /// ```
    /// use myiq::session::ChatSession;
    ///
    /// let session = ChatSession::new("New Chat");
    /// assert!(session.messages.is_empty());
    /// assert_eq!(session.created_at, session.updated_at);
    /// ```
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(new_session_id(), title)
    }

    /// Create a session with an explicit id
    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Title given to sessions started from the chat command
    pub fn default_title() -> String {
        format!("Chat {}", Local::now().format("%Y-%m-%d %H:%M"))
    }

    /// Append a message and refresh `updated_at`
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    /// Append a message built from its parts
    pub fn add_message(
        &mut self,
        text: impl Into<String>,
        is_user: bool,
        attachments: Vec<Attachment>,
    ) {
        let message = if is_user {
            Message::user(text, attachments)
        } else {
            let mut m = Message::assistant(text);
            m.attachments = attachments;
            m
        };
        self.push(message);
    }

    /// Refresh `updated_at`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.max(Utc::now());
    }

    /// Up to `n` most recent messages, oldest first
    pub fn recent_messages(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

/// A persisted notebook document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookSession {
    /// Unique identifier
    #[serde(rename = "session_id")]
    pub id: String,
    /// Display title
    pub title: String,
    /// Markdown content
    #[serde(default)]
    pub content: String,
    /// Creation time
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl NotebookSession {
    /// Create a notebook with a timestamp-derived id
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(new_session_id(), title, content)
    }

    /// Create a notebook with an explicit id
    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.max(Utc::now());
    }
}

impl Default for NotebookSession {
    fn default() -> Self {
        Self::new("Untitled", "")
    }
}

/// Accept RFC 3339 timestamps as well as offset-less ISO-8601 local times
/// written by older versions of the data files.
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid timestamp: {}", raw))
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
