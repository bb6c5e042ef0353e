//! TUI Renderer - Implements UiRenderer trait for terminal display
//!
//! Drawing and key mapping live here; session logic stays in AppService.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use std::time::Duration;

use crate::ui_backend::{AppEvent, Command, FocusedComponent, SharedState, UiRenderer};

use super::clipboard::ClipboardHandler;
use super::panels::{
    builder_rows, insight_rows, shortcut_rows, suggestion_rows, InputLine, ListPanel, StatusBar,
};
use super::theme::Theme;
use super::transcript::TranscriptView;

const PAGE_LINES: isize = 10;

/// TUI Renderer implementation
pub struct TuiRenderer<B: Backend> {
    terminal: Terminal<B>,
    theme: Theme,
    clipboard: ClipboardHandler,
}

impl<B: Backend> TuiRenderer<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            theme: Theme::default(),
            clipboard: ClipboardHandler::new(),
        }
    }

    /// Get reference to terminal (for testing)
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Convert keyboard event to command
    pub fn key_to_command(key: KeyEvent, state: &SharedState) -> Option<Command> {
        let focus = state.focused_component();

        match (key.code, key.modifiers) {
            // Application control
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => Some(Command::Quit),
            (KeyCode::Char('y'), KeyModifiers::CONTROL) => Some(Command::CopyLatestCode),

            // Focus management
            (KeyCode::Tab, KeyModifiers::NONE) => Some(Command::FocusNext),
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) => {
                Some(Command::FocusPrevious)
            }

            // Transcript scrolling
            (KeyCode::PageUp, _) => Some(Command::Scroll(PAGE_LINES)),
            (KeyCode::PageDown, _) => Some(Command::Scroll(-PAGE_LINES)),

            (KeyCode::Up, _) => Some(Command::MoveSelection(-1)),
            (KeyCode::Down, _) => Some(Command::MoveSelection(1)),

            (KeyCode::Enter, _) => Self::activate(focus, state),
            (KeyCode::Delete, _) if focus == FocusedComponent::Shortcuts => state
                .saved_queries()
                .get(state.selection())
                .map(|q| Command::DeleteShortcut(q.id)),

            // Text editing
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                Some(Command::InsertChar(c))
            }
            (KeyCode::Backspace, _) => Some(Command::DeleteCharBefore),
            (KeyCode::Left, _) if focus == FocusedComponent::Input => Some(Command::CursorLeft),
            (KeyCode::Right, _) if focus == FocusedComponent::Input => Some(Command::CursorRight),

            _ => None,
        }
    }

    /// Enter on the focused component
    fn activate(focus: FocusedComponent, state: &SharedState) -> Option<Command> {
        let selected = state.selection();
        match focus {
            FocusedComponent::Input => Some(Command::SendMessage(None)),
            FocusedComponent::Suggestions => state
                .suggestions()
                .get(selected)
                .cloned()
                .map(Command::SelectSuggestion),
            FocusedComponent::Insights => {
                state
                    .insight_entries()
                    .into_iter()
                    .nth(selected)
                    .map(|entry| match entry.category {
                        None => Command::SelectInsight(entry.query),
                        Some(_) => Command::SelectCategorySuggestion(entry.query),
                    })
            }
            FocusedComponent::Builder => state
                .builder_options()
                .into_iter()
                .nth(selected)
                .map(|option| Command::SelectBuilder {
                    field: option.field,
                    value: option.value,
                }),
            FocusedComponent::Shortcuts => state
                .saved_queries()
                .get(selected)
                .map(|q| Command::RunShortcut(q.id)),
            FocusedComponent::Messages => None,
        }
    }
}

impl<B: Backend> UiRenderer for TuiRenderer<B> {
    fn render(&mut self, state: &SharedState) -> Result<()> {
        let theme = &self.theme;
        let messages = state.messages();
        let focus = state.focused_component();
        let selection = state.selection();
        let status = state.status();
        let input_text = state.input_text();
        let placeholder = state.placeholder();
        let suggestions = state.suggestions();
        let insights = state.insight_entries();
        let builder = state.builder();
        let builder_options = state.builder_options();
        let saved = state.saved_queries();
        let identity = state.identity();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1), // Header
                    Constraint::Min(8),    // Body
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            let header = Line::from(vec![
                Span::styled(
                    "MarkSolution Enterprise",
                    Style::default().fg(theme.purple).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {} · {}", identity.role.display_name(), identity.branch.label()),
                    Style::default().fg(theme.text_secondary),
                ),
            ]);
            frame.render_widget(Paragraph::new(header), rows[0]);

            // Horizontal split: conversation | side panels (when wide enough)
            let (main_area, side_area) = if rows[1].width > 90 {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Min(50), Constraint::Length(44)])
                    .split(rows[1]);
                (columns[0], Some(columns[1]))
            } else {
                (rows[1], None)
            };

            let suggestion_height = if suggestions.is_empty() {
                0
            } else {
                (suggestions.len() as u16 + 2).min(7)
            };
            let main = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(3),
                    Constraint::Length(suggestion_height),
                    Constraint::Length(3),
                ])
                .split(main_area);

            frame.render_widget(
                TranscriptView::new(&messages, theme)
                    .loading(status.loading)
                    .scroll_offset(state.messages_scroll_offset())
                    .focused(focus == FocusedComponent::Messages),
                main[0],
            );
            if suggestion_height > 0 {
                frame.render_widget(
                    ListPanel::new("Suggestions", suggestion_rows(&suggestions, theme), theme)
                        .focus(focus == FocusedComponent::Suggestions, selection),
                    main[1],
                );
            }
            frame.render_widget(
                InputLine::new(
                    &input_text,
                    &placeholder,
                    focus == FocusedComponent::Input,
                    theme,
                ),
                main[2],
            );

            if let Some(side) = side_area {
                let panels = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Percentage(35),
                        Constraint::Percentage(40),
                        Constraint::Percentage(25),
                    ])
                    .split(side);

                frame.render_widget(
                    ListPanel::new("Quick insights", insight_rows(&insights, theme), theme)
                        .focus(focus == FocusedComponent::Insights, selection),
                    panels[0],
                );
                frame.render_widget(
                    ListPanel::new(
                        "Query builder",
                        builder_rows(&builder_options, &builder, theme),
                        theme,
                    )
                    .focus(focus == FocusedComponent::Builder, selection),
                    panels[1],
                );
                frame.render_widget(
                    ListPanel::new("Saved shortcuts", shortcut_rows(&saved, theme), theme)
                        .focus(focus == FocusedComponent::Shortcuts, selection),
                    panels[2],
                );
            }

            frame.render_widget(StatusBar::new(status.clone(), theme), rows[2]);
        })?;

        Ok(())
    }

    fn poll_input(&mut self, state: &SharedState) -> Result<Option<Command>> {
        // Non-blocking poll with short timeout
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Self::key_to_command(key, state));
                }
            }
        }
        Ok(None)
    }

    fn handle_event(&mut self, event: &AppEvent, state: &SharedState) -> Result<()> {
        match event {
            AppEvent::MessageAdded(_) | AppEvent::LoadingChanged(_) => state.scroll_to_newest(),
            AppEvent::CopyRequested { block_id, code } => {
                let message = match self.clipboard.copy_text(code) {
                    Ok(()) => format!("Copied {}", block_id),
                    Err(e) => {
                        tracing::warn!("Clipboard copy failed: {}", e);
                        format!("Copy failed: {}", e)
                    }
                };
                state.set_status_message(Some(message));
            }
            _ => {}
        }
        Ok(())
    }

    fn should_quit(&self, state: &SharedState) -> bool {
        state.should_quit()
    }
}
