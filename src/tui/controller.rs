//! TUI Controller - Orchestrates AppService and TuiRenderer
//!
//! The controller owns both the session logic (AppService) and the UI
//! (TuiRenderer), coordinating between them via Commands and AppEvents.

use anyhow::Result;
use ratatui::backend::Backend;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::ui_backend::{AppEvent, AppService, Command, PlaceholderCycle, SharedState, UiRenderer};

use super::renderer::TuiRenderer;

/// TUI Controller
///
/// Main event loop coordinator that:
/// 1. Renders UI with current state
/// 2. Polls input from renderer
/// 3. Processes commands through AppService
/// 4. Handles async events from AppService
pub struct TuiController<B: Backend> {
    service: AppService,
    renderer: TuiRenderer<B>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    placeholder: PlaceholderCycle,
    load_categories: bool,
}

impl<B: Backend> TuiController<B> {
    pub fn new(
        service: AppService,
        renderer: TuiRenderer<B>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        placeholder: PlaceholderCycle,
        load_categories: bool,
    ) -> Self {
        Self {
            service,
            renderer,
            event_rx,
            placeholder,
            load_categories,
        }
    }

    /// Run the main event loop
    pub async fn run(&mut self) -> Result<()> {
        let state = self.service.state().clone();
        state.set_placeholder(self.placeholder.current());

        if self.load_categories {
            let service = self.service.clone();
            tokio::spawn(async move { service.refresh_categories().await });
        }

        loop {
            // 1. Render current state
            self.renderer.render(&state)?;

            // 2. Poll for user input (non-blocking)
            if let Some(command) = self.renderer.poll_input(&state)? {
                self.dispatch(command).await?;
            }

            // 3. Process async events (non-blocking)
            self.poll_events(&state)?;

            // 4. Rotate the placeholder while the input is empty
            self.rotate_placeholder(&state, Instant::now());

            if self.renderer.should_quit(&state) {
                break;
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Ok(())
    }

    /// Advance the input placeholder; typed text freezes the rotation
    pub fn rotate_placeholder(&mut self, state: &SharedState, now: Instant) {
        if state.input_text().is_empty() && self.placeholder.tick(now) {
            state.set_placeholder(self.placeholder.current());
        }
    }

    /// Network-bound commands run in the background so the loading row and
    /// input stay live; everything else is applied in order.
    pub async fn dispatch(&mut self, command: Command) -> Result<()> {
        if command.is_network_bound() {
            let service = self.service.clone();
            tokio::spawn(async move {
                if let Err(e) = service.handle_command(command).await {
                    tracing::error!("Command failed: {}", e);
                }
            });
            Ok(())
        } else {
            self.service.handle_command(command).await
        }
    }

    pub fn poll_events(&mut self, state: &SharedState) -> Result<()> {
        while let Ok(event) = self.event_rx.try_recv() {
            tracing::trace!("AppEvent: {:?}", event);
            self.renderer.handle_event(&event, state)?;
        }
        Ok(())
    }
}
