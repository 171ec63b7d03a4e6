//! Configuration management for MyIQ
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::chat::ReplyOrdering;
use crate::error::{Result, MyIqError};
use crate::storage::CorruptionPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound accepted for `chat.history_window`
const MAX_HISTORY_WINDOW: usize = 100;

/// Upper bound accepted for `chat.max_concurrent_requests`
const MAX_CONCURRENT_REQUESTS: usize = 32;

/// Main configuration structure for MyIQ
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM endpoint settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Chat orchestration settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// On-disk persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local Ollama endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model identifier sent with every request
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Client-side request timeout in seconds; unset means wait indefinitely
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
            request_timeout_seconds: None,
        }
    }
}

/// Chat orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of most recent prior messages included in each prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Maximum LLM requests in flight at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Order in which replies to concurrent sends are delivered
    #[serde(default)]
    pub reply_ordering: ReplyOrdering,
}

fn default_history_window() -> usize {
    10
}

fn default_max_concurrent_requests() -> usize {
    4
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            max_concurrent_requests: default_max_concurrent_requests(),
            reply_ordering: ReplyOrdering::default(),
        }
    }
}

/// Persistence configuration
///
/// Each feature keeps its own directory under `data_dir`. Malformed JSON
/// handling is chosen per store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for `chat_history/`, `notebook_data/`, `calendar_data/`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// What to do when `chat_history/sessions.json` fails to parse
    #[serde(default = "default_recover")]
    pub chat_on_corrupt: CorruptionPolicy,

    /// What to do when a notebook file fails to parse
    #[serde(default = "default_fail")]
    pub notebook_on_corrupt: CorruptionPolicy,

    /// What to do when a calendar date file fails to parse
    #[serde(default = "default_fail")]
    pub calendar_on_corrupt: CorruptionPolicy,
}

fn default_recover() -> CorruptionPolicy {
    CorruptionPolicy::Recover
}

fn default_fail() -> CorruptionPolicy {
    CorruptionPolicy::Fail
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            chat_on_corrupt: default_recover(),
            notebook_on_corrupt: default_fail(),
            calendar_on_corrupt: default_fail(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Emit JSON-formatted log lines
    #[serde(default)]
    pub json: bool,

    /// Filter directive used when `RUST_LOG` is unset (e.g. `myiq=debug`)
    #[serde(default)]
    pub level: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MyIqError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MyIqError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("MYIQ_OLLAMA_HOST") {
            self.llm.host = host;
        }

        if let Ok(model) = std::env::var("MYIQ_OLLAMA_MODEL") {
            self.llm.model = model;
        }

        if let Ok(dir) = std::env::var("MYIQ_DATA_DIR") {
            tracing::debug!(data_dir = %dir, "Env override: MYIQ_DATA_DIR");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(window) = std::env::var("MYIQ_HISTORY_WINDOW") {
            match window.parse() {
                Ok(v) => self.chat.history_window = v,
                Err(_) => tracing::warn!("Invalid MYIQ_HISTORY_WINDOW: {}", window),
            }
        }

        if let Ok(max) = std::env::var("MYIQ_MAX_CONCURRENT") {
            match max.parse() {
                Ok(v) => self.chat.max_concurrent_requests = v,
                Err(_) => tracing::warn!("Invalid MYIQ_MAX_CONCURRENT: {}", max),
            }
        }

        if let Ok(timeout) = std::env::var("MYIQ_REQUEST_TIMEOUT") {
            match timeout.parse() {
                Ok(v) => self.llm.request_timeout_seconds = Some(v),
                Err(_) => tracing::warn!("Invalid MYIQ_REQUEST_TIMEOUT: {}", timeout),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(dir) = &cli.data_dir {
            tracing::debug!("Using data directory override from CLI: {}", dir.display());
            self.storage.data_dir = Some(dir.clone());
        }
        if cli.verbose {
            self.logging.level = Some("myiq=debug".to_string());
        }
    }

    /// Resolve the data root, falling back to the platform data directory
    ///
    /// # Errors
    ///
    /// Returns error if no override is set and the platform data directory
    /// cannot be determined
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        let proj_dirs = ProjectDirs::from("com", "myiq", "myiq")
            .ok_or_else(|| MyIqError::Storage("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `MyIqError::Config` describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        if self.llm.host.trim().is_empty() {
            return Err(MyIqError::Config("llm.host cannot be empty".to_string()).into());
        }
        if !self.llm.host.starts_with("http://") && !self.llm.host.starts_with("https://") {
            return Err(MyIqError::Config(format!(
                "llm.host must start with http:// or https://, got {}",
                self.llm.host
            ))
            .into());
        }
        if self.llm.model.trim().is_empty() {
            return Err(MyIqError::Config("llm.model cannot be empty".to_string()).into());
        }
        if self.llm.request_timeout_seconds == Some(0) {
            return Err(MyIqError::Config(
                "llm.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.history_window == 0 {
            return Err(
                MyIqError::Config("chat.history_window must be greater than 0".to_string()).into(),
            );
        }
        if self.chat.history_window > MAX_HISTORY_WINDOW {
            return Err(MyIqError::Config(format!(
                "chat.history_window cannot exceed {}",
                MAX_HISTORY_WINDOW
            ))
            .into());
        }
        if self.chat.max_concurrent_requests == 0 {
            return Err(MyIqError::Config(
                "chat.max_concurrent_requests must be greater than 0".to_string(),
            )
            .into());
        }
        if self.chat.max_concurrent_requests > MAX_CONCURRENT_REQUESTS {
            return Err(MyIqError::Config(format!(
                "chat.max_concurrent_requests cannot exceed {}",
                MAX_CONCURRENT_REQUESTS
            ))
            .into());
        }

        Ok(())
    }
}
