//! Application Events
//!
//! Async events sent from the backend to the frontend.

use super::types::Message;

/// Events emitted by the backend to the frontend
///
/// These are sent via an mpsc channel; frontends react to them (scrolling,
/// clipboard) while the data itself lives in `SharedState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A new message was appended to the transcript
    MessageAdded(Message),

    /// A chat request started or finished
    LoadingChanged(bool),

    /// The autocomplete list was replaced
    SuggestionsUpdated,

    /// Server suggestion categories arrived
    CategoriesLoaded(usize),

    /// A shortcut was saved or deleted
    ShortcutsChanged,

    /// The frontend should place this code on the clipboard
    CopyRequested { block_id: String, code: String },

    /// Status message changed
    StatusChanged(String),
}
