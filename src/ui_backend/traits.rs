//! UI Renderer Trait
//!
//! Defines the interface that all frontends must implement.

use anyhow::Result;

use super::commands::Command;
use super::events::AppEvent;
use super::state::SharedState;

/// Trait that all UI renderers must implement
///
/// This abstracts the UI layer from the session logic, so the same backend
/// can drive the terminal frontend or a headless test harness.
pub trait UiRenderer {
    /// Render the current application state
    ///
    /// This is called on every frame.
    fn render(&mut self, state: &SharedState) -> Result<()>;

    /// Poll for user input without blocking the loop for long
    fn poll_input(&mut self, state: &SharedState) -> Result<Option<Command>>;

    /// React to a backend event (scroll to newest, clipboard, ...)
    fn handle_event(&mut self, event: &AppEvent, state: &SharedState) -> Result<()>;

    /// Check if the UI should quit
    fn should_quit(&self, state: &SharedState) -> bool;
}
