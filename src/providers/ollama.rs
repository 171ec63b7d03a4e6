//! Ollama client
//!
//! Sends non-streaming requests to a local or remote Ollama server's
//! `/api/generate` endpoint and lists installed models via `/api/tags`.

use crate::config::LlmConfig;
use crate::error::{MyIqError, Result};
use crate::providers::{LlmClient, ModelInfo};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama API client
///
/// # Examples
///
/// ```
/// use myiq::config::LlmConfig;
/// use myiq::providers::{LlmClient, OllamaClient};
///
/// let client = OllamaClient::new(LlmConfig::default()).unwrap();
/// assert_eq!(client.host(), "http://localhost:11434");
/// assert_eq!(client.model(), "llama3.2:latest");
/// ```
pub struct OllamaClient {
    client: Client,
    config: LlmConfig,
}

/// Request body for `/api/generate`
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body from `/api/generate`
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: usize,
    #[serde(default)]
    eval_count: usize,
}

/// Response from `/api/tags`
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

impl OllamaClient {
    /// Create a new client
    ///
    /// A client-side timeout is applied only when
    /// `request_timeout_seconds` is set.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: LlmConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("myiq/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| MyIqError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Ollama client: host={}, model={}",
            config.host,
            config.model
        );

        Ok(Self { client, config })
    }

    /// Configured Ollama host
    pub fn host(&self) -> &str {
        &self.config.host
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint("/api/generate");
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        tracing::debug!(url = %url, model = %self.config.model, "Sending Ollama generate request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Ollama request failed: {}", e);
                MyIqError::Llm(format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Ollama returned error {}: {}", status, error_text);
            return Err(MyIqError::Llm(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Ollama response: {}", e);
            MyIqError::Llm(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            "Ollama response: done={}, prompt_tokens={}, completion_tokens={}",
            body.done,
            body.prompt_eval_count,
            body.eval_count
        );

        Ok(body.response.trim().to_string())
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.endpoint("/api/tags");
        tracing::debug!("Fetching models from Ollama: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Failed to fetch Ollama models: {}", e);
            MyIqError::Llm(format!("Failed to connect to Ollama server: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MyIqError::Llm(format!(
                "Ollama returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| MyIqError::Llm(format!("Failed to parse Ollama response: {}", e)))?;
        Ok(tags.models)
    }
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }
    format!("{:.1}{}", size, UNITS[unit_idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = OllamaClient::new(LlmConfig {
            host: "http://localhost:11434/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint("/api/generate"),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateRequest {
            model: "llama3.2:latest",
            prompt: "hi",
            stream: false,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"model": "llama3.2:latest", "prompt": "hi", "stream": false})
        );
    }

    #[test]
    fn test_response_missing_field_defaults_to_empty() {
        let body: GenerateResponse = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert_eq!(body.response, "");
    }

    #[test]
    fn test_client_with_timeout_builds() {
        let client = OllamaClient::new(LlmConfig {
            request_timeout_seconds: Some(5),
            ..Default::default()
        });
        assert!(client.is_ok());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512.0B");
        assert_eq!(format_size(2048), "2.0KB");
        assert_eq!(format_size(2_019_393_189), "1.9GB");
    }
}
