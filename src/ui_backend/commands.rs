//! User Commands
//!
//! Defines all possible user actions that can be triggered from the UI.

use super::query_builder::BuilderField;

/// User commands that can be executed
///
/// These represent user actions translated from keybindings or from a
/// one-shot CLI invocation. The AppService handles these commands and
/// updates state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ========== Application Control ==========
    /// Quit the application
    Quit,

    // ========== Focus Management ==========
    /// Cycle focus to next component
    FocusNext,

    /// Cycle focus to previous component
    FocusPrevious,

    /// Move the highlighted row of the focused list
    MoveSelection(isize),

    // ========== Input Editing ==========
    InsertChar(char),
    DeleteCharBefore,
    CursorLeft,
    CursorRight,
    /// Replace the whole input buffer
    SetInput(String),

    // ========== Conversation ==========
    /// Send the input buffer, or the given text without touching the buffer
    SendMessage(Option<String>),

    /// Scroll the transcript up (positive) or down (negative) by lines
    Scroll(isize),

    /// Copy the newest fenced code block
    CopyLatestCode,

    // ========== Suggestions ==========
    /// Activate a quick-insight chip
    SelectInsight(String),

    /// Activate an item from a server suggestion category
    SelectCategorySuggestion(String),

    /// Pick an autocomplete suggestion
    SelectSuggestion(String),

    /// Set one query builder field
    SelectBuilder { field: BuilderField, value: String },

    // ========== Saved Shortcuts ==========
    RunShortcut(i64),
    DeleteShortcut(i64),
}

impl Command {
    /// Commands that may wait on the answering service.
    ///
    /// Frontends run these off the render loop so the loading row stays live.
    pub fn is_network_bound(&self) -> bool {
        matches!(
            self,
            Command::SendMessage(_)
                | Command::SelectInsight(_)
                | Command::SelectCategorySuggestion(_)
                | Command::SelectSuggestion(_)
                | Command::SelectBuilder { .. }
                | Command::RunShortcut(_)
        )
    }
}
