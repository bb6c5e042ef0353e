//! Terminal frontend
//!
//! A ratatui/crossterm frontend over the `ui_backend` session controller.

mod clipboard;
mod controller;
mod panels;
mod renderer;
mod theme;
mod transcript;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::panic;
use tokio::sync::mpsc;

use crate::config::UiConfig;
use crate::ui_backend::{AppEvent, AppService, PlaceholderCycle};

pub use controller::TuiController;
pub use renderer::TuiRenderer;
pub use theme::Theme;
pub use transcript::{transcript_lines, wrap_text, TranscriptView, LOADING_TEXT};

/// Run an interactive session until the user quits
pub async fn run_chat(
    service: AppService,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    ui: &UiConfig,
    load_categories: bool,
) -> Result<()> {
    install_panic_hook();
    let terminal = setup_terminal().context("Failed to initialize terminal")?;

    let placeholder = PlaceholderCycle::new(
        ui.placeholders.clone(),
        std::time::Duration::from_millis(ui.placeholder_interval_ms),
    );
    let mut controller = TuiController::new(
        service,
        TuiRenderer::new(terminal),
        event_rx,
        placeholder,
        load_categories,
    );

    let result = controller.run().await;
    restore_terminal()?;
    result
}

/// Install a panic hook that restores the terminal before panicking
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}
