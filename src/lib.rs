//! mark-assistant: terminal client for the MarkSolution business-query assistant
//!
//! This library provides:
//! - A client for the remote answering service (`/chat`, `/suggest`, `/suggestions`)
//! - The session controller: message sending, local "save as" commands,
//!   role-gated insights, debounced autocomplete and the query builder
//! - Durable saved shortcuts
//! - A ratatui terminal frontend

pub mod answering;
pub mod config;
pub mod core;
pub mod storage;
pub mod tui;
pub mod ui_backend;

pub use config::Config;
pub use storage::ShortcutStore;
