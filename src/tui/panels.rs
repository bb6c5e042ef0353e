//! Side panels, input line and status bar

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::storage::SavedQuery;
use crate::ui_backend::{BuilderField, BuilderOption, InsightEntry, QueryBuilder, StatusInfo};

use super::theme::Theme;

/// A titled list with an optional highlighted row
pub struct ListPanel<'a> {
    title: String,
    rows: Vec<Line<'static>>,
    selected: Option<usize>,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> ListPanel<'a> {
    pub fn new(title: impl Into<String>, rows: Vec<Line<'static>>, theme: &'a Theme) -> Self {
        Self {
            title: title.into(),
            rows,
            selected: None,
            focused: false,
            theme,
        }
    }

    /// Highlight `selected` when the panel has focus
    pub fn focus(mut self, focused: bool, selected: usize) -> Self {
        self.focused = focused;
        self.selected = focused.then_some(selected);
        self
    }
}

impl Widget for ListPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_for(self.focused)))
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.rows.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "(none)",
                Style::default().fg(self.theme.text_muted),
            )))
            .render(inner, buf);
            return;
        }

        // Keep the highlighted row on screen
        let height = inner.height as usize;
        let first = match self.selected {
            Some(sel) if height > 0 && sel >= height => sel + 1 - height,
            _ => 0,
        };

        let rows: Vec<Line> = self
            .rows
            .into_iter()
            .enumerate()
            .skip(first)
            .map(|(i, row)| {
                if Some(i) == self.selected {
                    row.style(
                        Style::default()
                            .bg(self.theme.highlight_bg)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    row
                }
            })
            .collect();
        Paragraph::new(rows).render(inner, buf);
    }
}

pub fn suggestion_rows(suggestions: &[String], theme: &Theme) -> Vec<Line<'static>> {
    suggestions
        .iter()
        .map(|s| Line::from(Span::styled(format!("↳ {}", s), Style::default().fg(theme.cyan))))
        .collect()
}

pub fn insight_rows(entries: &[InsightEntry], theme: &Theme) -> Vec<Line<'static>> {
    entries
        .iter()
        .map(|entry| match &entry.category {
            None => Line::from(vec![
                Span::styled("★ ", Style::default().fg(theme.yellow)),
                Span::styled(entry.query.clone(), Style::default().fg(theme.text_primary)),
            ]),
            Some(category) => Line::from(vec![
                Span::styled(format!("{}: ", category), Style::default().fg(theme.text_muted)),
                Span::styled(entry.query.clone(), Style::default().fg(theme.text_secondary)),
            ]),
        })
        .collect()
}

pub fn builder_rows(
    options: &[BuilderOption],
    builder: &QueryBuilder,
    theme: &Theme,
) -> Vec<Line<'static>> {
    options
        .iter()
        .map(|option| {
            let chosen = builder.get(option.field) == option.value;
            let marker = if chosen { "● " } else { "○ " };
            let label_style = Style::default().fg(match option.field {
                BuilderField::Metric => theme.purple,
                BuilderField::Period => theme.cyan,
                BuilderField::Branch => theme.green,
            });
            Line::from(vec![
                Span::styled(marker, label_style),
                Span::styled(format!("{:<7}", option.field.label()), label_style),
                Span::styled(option.value.clone(), Style::default().fg(theme.text_primary)),
            ])
        })
        .collect()
}

pub fn shortcut_rows(saved: &[SavedQuery], theme: &Theme) -> Vec<Line<'static>> {
    saved
        .iter()
        .map(|q| {
            Line::from(vec![
                Span::styled(
                    q.label.clone(),
                    Style::default().fg(theme.green).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", q.query), Style::default().fg(theme.text_secondary)),
            ])
        })
        .collect()
}

/// Single-line input with placeholder
pub struct InputLine<'a> {
    text: &'a str,
    placeholder: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> InputLine<'a> {
    pub fn new(text: &'a str, placeholder: &'a str, focused: bool, theme: &'a Theme) -> Self {
        Self {
            text,
            placeholder,
            focused,
            theme,
        }
    }
}

impl Widget for InputLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_for(self.focused)))
            .title(" Ask ");
        let line = if self.text.is_empty() {
            Line::from(Span::styled(
                self.placeholder.to_string(),
                Style::default().fg(self.theme.text_muted),
            ))
        } else {
            Line::from(Span::styled(
                self.text.to_string(),
                Style::default().fg(self.theme.text_primary),
            ))
        };
        Paragraph::new(line).block(block).render(area, buf);
    }
}

/// Bottom status bar: identity, loading flag, last status message
pub struct StatusBar<'a> {
    status: StatusInfo,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(status: StatusInfo, theme: &'a Theme) -> Self {
        Self { status, theme }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(
            self.status.identity,
            Style::default().fg(self.theme.text_secondary),
        )];
        if self.status.loading {
            spans.push(Span::styled("  ◐ working", Style::default().fg(self.theme.yellow)));
        }
        if let Some(message) = self.status.message {
            spans.push(Span::styled(
                format!("  {}", message),
                Style::default().fg(self.theme.text_muted),
            ));
        }
        spans.push(Span::styled(
            "  Tab focus · Enter run · Del remove · Ctrl+Y copy · Esc quit",
            Style::default().fg(self.theme.text_muted),
        ));
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
