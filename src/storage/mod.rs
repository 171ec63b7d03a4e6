//! File-backed JSON persistence
//!
//! Every store is a direct read-modify-write over JSON files under a
//! feature directory. There is no cache: each read re-parses from disk and
//! each write replaces the whole target file. Writes go to a sibling
//! temporary file that is then renamed over the target, so a crash leaves
//! either the old or the new contents.

use crate::error::{MyIqError, Result};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod calendar;
pub mod chat;
pub mod notebook;
pub mod types;

pub use calendar::{parse_date, CalendarEvent, CalendarStore};
pub use chat::ChatHistoryStore;
pub use notebook::NotebookStore;
pub use types::{CorruptionPolicy, SessionSummary};

/// Directory name for the chat history aggregate file
pub const CHAT_DIR: &str = "chat_history";
/// Directory name for notebook files
pub const NOTEBOOK_DIR: &str = "notebook_data";
/// Directory name for per-date calendar files
pub const CALENDAR_DIR: &str = "calendar_data";

/// Durable CRUD over a named collection of session-like records
pub trait SessionStore {
    /// Record type persisted by this store
    type Record;

    /// Load a record by id; `Ok(None)` when it does not exist
    fn load(&self, id: &str) -> Result<Option<Self::Record>>;

    /// Refresh the record's `updated_at` and persist it in full
    fn save(&self, record: &mut Self::Record) -> Result<()>;

    /// Remove a record; deleting an unknown id is a no-op
    fn delete(&self, id: &str) -> Result<()>;

    /// Summaries of every record, most recently updated first
    fn list(&self) -> Result<Vec<SessionSummary>>;
}

/// Sort summaries by `updated_at` descending, keeping enumeration order on ties
pub fn sort_summaries(summaries: &mut [SessionSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Create a feature directory under `root` if it does not exist
pub(crate) fn ensure_dir(root: &Path, name: &str) -> Result<PathBuf> {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))
        .map_err(|e| MyIqError::Storage(format!("{:#}", e)))?;
    Ok(dir)
}

/// Read and parse a JSON file
///
/// Returns `Ok(None)` when the file does not exist. When it exists but does
/// not parse, `policy` decides between `Ok(None)` and `MyIqError::Corrupt`.
pub(crate) fn read_json<T: DeserializeOwned>(
    path: &Path,
    policy: CorruptionPolicy,
) -> Result<Option<T>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(anyhow::Error::new(MyIqError::Io(e))
                .context(format!("Failed to read {}", path.display())))
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Ok(Some(value)),
        Err(e) => match policy {
            CorruptionPolicy::Recover => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring malformed JSON file"
                );
                Ok(None)
            }
            CorruptionPolicy::Fail => Err(MyIqError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()),
        },
    }
}

/// Serialize `value` as 2-space indented JSON and atomically replace `path`
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(MyIqError::Serialization)?;

    let tmp = tmp_path(path);
    std::fs::write(&tmp, json.as_bytes())
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(anyhow::Error::new(MyIqError::Io(e))
            .context(format!("Failed to replace {}", path.display())));
    }

    tracing::debug!(path = %path.display(), bytes = json.len(), "Wrote JSON file");
    Ok(())
}

/// Remove a file, treating "already gone" as success
pub(crate) fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow::Error::new(MyIqError::Io(e))
            .context(format!("Failed to remove {}", path.display()))),
    }
}

/// Reject ids that would escape the store directory when used as a file name
pub(crate) fn validate_file_id(id: &str) -> Result<()> {
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\'])
        || id.contains('\0')
    {
        return Err(MyIqError::InvalidInput(format!("invalid session id: {:?}", id)).into());
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
