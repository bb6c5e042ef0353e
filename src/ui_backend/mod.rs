//! UI Backend - Backend-for-Frontend (BFF) Layer
//!
//! This module separates the session logic from rendering, so the terminal
//! frontend, the one-shot CLI and the tests all drive the same controller.
//!
//! ## Architecture
//!
//! - **AppService**: Session controller (send, intercept, suggestions, shortcuts)
//! - **AppEvent**: Async event channel for UI reactions
//! - **UiRenderer**: Trait that frontends implement
//! - **SharedState**: Thread-safe session state
//! - **Command**: User actions mapped from keybindings/UI

mod commands;
mod errors;
mod events;
pub mod formatter;
pub mod interceptor;
pub mod placeholder;
pub mod query_builder;
mod service;
mod state;
pub mod suggestions;
mod traits;
mod types;

pub use commands::Command;
pub use errors::ShortcutError;
pub use events::AppEvent;
pub use formatter::format_message;
pub use interceptor::{CommandResult, LocalCommand};
pub use placeholder::PlaceholderCycle;
pub use query_builder::{BuilderField, QueryBuilder};
pub use service::{AppService, CONNECTION_ERROR_TEXT, INVALID_RESPONSE_TEXT};
pub use state::{BuilderOption, FocusedComponent, InsightEntry, SharedState};
pub use suggestions::{Autocomplete, Insight, InsightCatalog};
pub use traits::UiRenderer;
pub use types::{Message, MessageSegment, Sender, StatusInfo};
