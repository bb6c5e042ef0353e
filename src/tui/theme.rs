//! Colors for the terminal frontend

use ratatui::style::Color;

/// Theme colors for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg_code: Color,

    pub border: Color,
    pub border_focused: Color,

    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    pub cyan: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
    pub purple: Color,

    pub user_fg: Color,
    pub bot_fg: Color,
    pub highlight_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

impl Theme {
    /// Catppuccin Mocha
    pub fn catppuccin_mocha() -> Self {
        Self {
            bg_code: Color::Rgb(49, 50, 68),

            border: Color::Rgb(69, 71, 90),
            border_focused: Color::Rgb(137, 180, 250),

            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(166, 173, 200),
            text_muted: Color::Rgb(108, 112, 134),

            cyan: Color::Rgb(148, 226, 213),
            green: Color::Rgb(166, 227, 161),
            yellow: Color::Rgb(249, 226, 175),
            red: Color::Rgb(243, 139, 168),
            purple: Color::Rgb(203, 166, 247),

            user_fg: Color::Rgb(137, 180, 250),
            bot_fg: Color::Rgb(166, 227, 161),
            highlight_bg: Color::Rgb(35, 40, 60),
        }
    }

    pub fn border_for(&self, focused: bool) -> Color {
        if focused {
            self.border_focused
        } else {
            self.border
        }
    }
}
