use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing entry for a stored session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique identifier for the session
    pub id: String,
    /// User-facing title
    pub title: String,
    /// When the session was last updated
    pub updated_at: DateTime<Utc>,
}

/// How a store reacts to a JSON file that fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionPolicy {
    /// Log a warning and treat the data as absent/empty
    Recover,
    /// Return `MyIqError::Corrupt`
    Fail,
}
