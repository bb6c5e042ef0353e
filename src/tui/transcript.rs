//! Transcript rendering
//!
//! Messages are split into segments on every render and flattened into
//! display lines. Code blocks carry their block id in the header so the user
//! can tell which block Ctrl+Y copies.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

use crate::ui_backend::{format_message, Message, MessageSegment, Sender};

use super::theme::Theme;

/// Row shown below the transcript while a chat request is in flight
pub const LOADING_TEXT: &str = "Analyzing securely...";

/// Split `text` into rows no wider than `max_width` display columns
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut width = 0usize;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            width = 0;
        }
        current.push(ch);
        width += ch_width;
    }
    rows.push(current);
    rows
}

fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, prefix: &str, style: Style, width: usize) {
    let inner = width.saturating_sub(prefix.chars().count());
    for logical in text.split('\n') {
        for row in wrap_text(logical, inner) {
            lines.push(Line::from(vec![
                Span::raw(prefix.to_string()),
                Span::styled(row, style),
            ]));
        }
    }
}

/// Flatten the transcript into display lines for a view `width` columns wide
pub fn transcript_lines(
    messages: &[Message],
    loading: bool,
    theme: &Theme,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (index, message) in messages.iter().enumerate() {
        let (name, color) = match message.sender {
            Sender::User => ("You", theme.user_fg),
            Sender::Bot => ("Mark", theme.bot_fg),
        };
        lines.push(Line::from(vec![
            Span::styled(
                name.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", message.timestamp),
                Style::default().fg(theme.text_muted),
            ),
        ]));

        for segment in format_message(&message.text, index) {
            match segment {
                MessageSegment::Text { content } => {
                    let trimmed = content.trim_matches('\n');
                    if !trimmed.is_empty() {
                        push_wrapped(
                            &mut lines,
                            trimmed,
                            "  ",
                            Style::default().fg(theme.text_primary),
                            width,
                        );
                    }
                }
                MessageSegment::Code {
                    language,
                    code,
                    block_id,
                } => {
                    lines.push(Line::from(Span::styled(
                        format!("  ┌─ {} [{}]", language, block_id),
                        Style::default().fg(theme.purple),
                    )));
                    push_wrapped(
                        &mut lines,
                        &code,
                        "  │ ",
                        Style::default().fg(theme.text_primary).bg(theme.bg_code),
                        width,
                    );
                    lines.push(Line::from(Span::styled(
                        "  └─".to_string(),
                        Style::default().fg(theme.purple),
                    )));
                }
            }
        }
        lines.push(Line::default());
    }

    if loading {
        lines.push(Line::from(Span::styled(
            format!("  {}", LOADING_TEXT),
            Style::default()
                .fg(theme.yellow)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Scrollable transcript panel
pub struct TranscriptView<'a> {
    messages: &'a [Message],
    loading: bool,
    scroll_offset: usize,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> TranscriptView<'a> {
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            loading: false,
            scroll_offset: 0,
            focused: false,
            theme,
        }
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Lines scrolled up from the newest
    pub fn scroll_offset(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for TranscriptView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_for(self.focused)))
            .title(" Conversation ");
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = transcript_lines(
            self.messages,
            self.loading,
            self.theme,
            inner.width as usize,
        );
        let height = inner.height as usize;
        let end = lines.len().saturating_sub(self.scroll_offset).max(height.min(lines.len()));
        let start = end.saturating_sub(height);

        Paragraph::new(lines[start..end].to_vec()).render(inner, buf);
    }
}
