/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`      Interactive or one-shot chat with the configured model
- `history`   List, show, rename and delete chat sessions
- `notebook`  Markdown notebooks with HTML/markdown export
- `calendar`  Per-date event lists
- `models`    Model listing

Handlers are small and delegate to the library's stores and services.
*/

pub mod calendar;
pub mod chat;
pub mod history;
pub mod models;
pub mod notebook;

// Slash commands recognised inside interactive chat
pub mod special_commands;
