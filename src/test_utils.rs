//! Test utilities for MyIQ
//!
//! This module provides common test utilities including temporary directory
//! management, test file creation, a scripted LLM client, and assertion
//! helpers.

use crate::config::Config;
use crate::error::Result;
use crate::providers::{LlmClient, ModelInfo};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Default configuration with its data directory inside `dir`
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = Some(dir.path().to_path_buf());
    config
}

/// LLM client that answers from a script and records every prompt
///
/// Each prompt may start with `<millis>:` to delay the reply, which lets
/// tests force a completion order. Without a script the client echoes the
/// prompt back.
pub struct ScriptedClient {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    /// Client that echoes prompts
    pub fn echo() -> Self {
        Self::with_replies(Vec::<String>::new())
    }

    /// Client that returns `replies` in order, then echoes
    pub fn with_replies<S: Into<String>>(replies: Vec<S>) -> Self {
        let mut replies: Vec<String> = replies.into_iter().map(Into::into).collect();
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in arrival order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());

        if let Some((delay, _)) = prompt.split_once(':') {
            if let Ok(ms) = delay.parse::<u64>() {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
        }

        let scripted = self.replies.lock().expect("reply script poisoned").pop();
        Ok(scripted.unwrap_or_else(|| prompt.to_string()))
    }

    fn model(&self) -> String {
        "scripted".to_string()
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            name: self.model(),
            size: 0,
            modified_at: String::new(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_client_replies_then_echoes() {
        let client = ScriptedClient::with_replies(vec!["first"]);
        assert_eq!(client.generate("a").await.unwrap(), "first");
        assert_eq!(client.generate("b").await.unwrap(), "b");
        assert_eq!(client.prompts(), vec!["a", "b"]);
    }

    #[test]
    fn test_test_config_uses_temp_dir() {
        let dir = temp_dir();
        let config = test_config(&dir);
        assert_eq!(config.data_dir().unwrap(), dir.path());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "a.txt", "x");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "x");
    }
}
