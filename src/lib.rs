//! MyIQ - local LLM chat, notebooks and calendar
//!
//! This library provides the core of the MyIQ personal assistant: chat with a
//! local Ollama model over persisted conversation history, markdown
//! notebooks, and a per-date event calendar.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Chat and notebook records
//! - `storage`: JSON-file stores for chat history, notebooks and the calendar
//! - `providers`: LLM client abstraction and the Ollama implementation
//! - `chat`: Prompt assembly, the background request runner and orchestration
//! - `extract`: Attachment text extraction
//! - `notebook`: Markdown rendering and export
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use myiq::chat::ChatService;
//! use myiq::providers::{LlmClient, OllamaClient};
//! use myiq::storage::ChatHistoryStore;
//! use myiq::Config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = ChatHistoryStore::open(&config.data_dir()?, config.storage.chat_on_corrupt)?;
//!     let client: Arc<dyn LlmClient> = Arc::new(OllamaClient::new(config.llm.clone())?);
//!     let mut service = ChatService::new(store, client, &config.chat);
//!
//!     let mut session = service.new_session(None);
//!     let reply = service.ask(&mut session, "Hello!", vec![]).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod notebook;
pub mod providers;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use chat::{build_prompt, ChatReply, ChatService, ReplyOrdering, RequestRunner};
pub use config::Config;
pub use error::{MyIqError, Result};
pub use providers::{get_llm_response, LlmClient, OllamaClient};
pub use session::{Attachment, ChatSession, Message, NotebookSession};
pub use storage::{
    CalendarEvent, CalendarStore, ChatHistoryStore, CorruptionPolicy, NotebookStore, SessionStore,
};

#[cfg(test)]
pub mod test_utils;
