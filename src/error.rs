//! Error types for MyIQ
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for MyIQ operations
///
/// Covers configuration loading, JSON persistence, LLM transport,
/// attachment extraction, and notebook export failures.
#[derive(Error, Debug)]
pub enum MyIqError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage errors (directory creation, file replacement, etc.)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A persisted JSON file could not be parsed
    #[error("Corrupt data in {}: {reason}", path.display())]
    Corrupt {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A record addressed by id or index does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller supplied an unusable value (empty text, bad date, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// LLM endpoint errors (connection, status, body)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Attachment extraction errors
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Notebook export errors
    #[error("Export error: {0}")]
    Export(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for MyIQ operations
///
/// Uses `anyhow::Error` so callers can attach context while still being
/// able to `downcast_ref::<MyIqError>()` for the typed cause.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = MyIqError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_corrupt_error_display_includes_path() {
        let error = MyIqError::Corrupt {
            path: PathBuf::from("chat_history/sessions.json"),
            reason: "expected value at line 1".to_string(),
        };
        let s = error.to_string();
        assert!(s.contains("chat_history/sessions.json"));
        assert!(s.contains("expected value"));
    }

    #[test]
    fn test_not_found_error_display() {
        let error = MyIqError::NotFound("session 20240501_120000".to_string());
        assert_eq!(error.to_string(), "Not found: session 20240501_120000");
    }

    #[test]
    fn test_invalid_input_error_display() {
        let error = MyIqError::InvalidInput("event text is empty".to_string());
        assert_eq!(error.to_string(), "Invalid input: event text is empty");
    }

    #[test]
    fn test_llm_error_display() {
        let error = MyIqError::Llm("connection refused".to_string());
        assert_eq!(error.to_string(), "LLM error: connection refused");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: MyIqError = io_error.into();
        assert!(matches!(error, MyIqError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: MyIqError = json_error.into();
        assert!(matches!(error, MyIqError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: MyIqError = yaml_error.into();
        assert!(matches!(error, MyIqError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MyIqError>();
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let result: Result<()> = Err(MyIqError::NotFound("x".into()).into());
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MyIqError>(),
            Some(MyIqError::NotFound(_))
        ));
    }
}
