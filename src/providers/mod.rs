//! LLM client abstraction
//!
//! The chat layer talks to a local generation endpoint through the
//! [`LlmClient`] trait. [`get_llm_response`] is the boundary used by the
//! request runner: it never fails, turning any transport or parse problem
//! into a sentinel string that is shown and stored like a normal reply.

pub mod ollama;

pub use ollama::OllamaClient;

use crate::config::LlmConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Prefix of the sentinel reply produced when the LLM call fails
pub const LLM_ERROR_PREFIX: &str = "[Error talking to LLM:";

/// Model listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier, e.g. `llama3.2:latest`
    pub name: String,
    /// Size on disk in bytes, when reported
    #[serde(default)]
    pub size: u64,
    /// Last modification time as reported by the server
    #[serde(default)]
    pub modified_at: String,
}

/// One-shot text generation against a language model
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier sent with each request
    fn model(&self) -> String;

    /// Models available on the server
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

/// Generate a reply, converting any failure into a sentinel string
///
/// # Examples
///
/// ```no_run
/// use myiq::config::LlmConfig;
/// use myiq::providers::{get_llm_response, OllamaClient};
///
/// # async fn example() -> myiq::error::Result<()> {
/// let client = OllamaClient::new(LlmConfig::default())?;
/// let reply = get_llm_response(&client, "Hello!").await;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
pub async fn get_llm_response(client: &dyn LlmClient, prompt: &str) -> String {
    tracing::debug!(prompt_chars = prompt.len(), "Sending prompt");
    match client.generate(prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("LLM request failed: {:#}", e);
            format!("{} {:#}]", LLM_ERROR_PREFIX, e)
        }
    }
}

/// Whether a stored reply is an error sentinel
pub fn is_error_reply(text: &str) -> bool {
    text.starts_with(LLM_ERROR_PREFIX)
}

/// Create the configured client
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    Ok(Box::new(OllamaClient::new(config.clone())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MyIqError;

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(MyIqError::Llm("connection refused".into()).into())
        }
        fn model(&self) -> String {
            "none".into()
        }
        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(vec![])
        }
    }

    struct EchoClient;

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("echo: {}", prompt))
        }
        fn model(&self) -> String {
            "echo".into()
        }
        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_get_llm_response_converts_errors_to_sentinel() {
        let reply = get_llm_response(&FailingClient, "hi").await;
        assert!(reply.contains("[Error talking to LLM:"));
        assert!(reply.contains("connection refused"));
        assert!(reply.ends_with(']'));
        assert!(is_error_reply(&reply));
    }

    #[tokio::test]
    async fn test_get_llm_response_passes_through_success() {
        let reply = get_llm_response(&EchoClient, "hi").await;
        assert_eq!(reply, "echo: hi");
        assert!(!is_error_reply(&reply));
    }

    #[test]
    fn test_create_client_uses_config_model() {
        let config = LlmConfig {
            model: "phi3:mini".to_string(),
            ..Default::default()
        };
        let client = create_client(&config).unwrap();
        assert_eq!(client.model(), "phi3:mini");
    }
}
