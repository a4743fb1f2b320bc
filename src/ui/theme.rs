//! Greyscale theme for codeassist
//!
//! Monochrome palette with two accents: green for success, red for errors.

use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    // ─────────────────────────────────────────────────────────────────────
    // Greyscale, brightest to darkest
    // ─────────────────────────────────────────────────────────────────────

    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    /// Headers, selected items
    pub const GREY_50: Color = Color::Rgb(250, 250, 250);
    /// Primary text
    pub const GREY_100: Color = Color::Rgb(220, 220, 220);
    pub const GREY_200: Color = Color::Rgb(180, 180, 180);
    /// Muted text
    pub const GREY_300: Color = Color::Rgb(140, 140, 140);
    pub const GREY_400: Color = Color::Rgb(100, 100, 100);
    /// Borders, separators
    pub const GREY_500: Color = Color::Rgb(70, 70, 70);
    pub const GREY_600: Color = Color::Rgb(45, 45, 45);
    /// Overlay backgrounds
    pub const GREY_700: Color = Color::Rgb(35, 35, 35);
    pub const GREY_800: Color = Color::Rgb(28, 28, 28);
    pub const GREY_900: Color = Color::Rgb(18, 18, 18);

    pub const BG: Color = Self::GREY_900;

    pub const GREEN: Color = Color::Rgb(100, 200, 100);
    pub const RED: Color = Color::Rgb(200, 100, 100);
    pub const YELLOW: Color = Color::Rgb(220, 190, 90);

    pub const LOGO: &'static str = "c o d e a s s i s t";
    pub const TAGLINE: &'static str = "review · test · debug · plan";

    pub const SPINNER_BRAILLE: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

    pub const ICON_DIR: &'static str = "▸ ";
    pub const ICON_FILE: &'static str = "  ";
    pub const ICON_OTHER: &'static str = "· ";
    pub const ICON_REPO: &'static str = "◆ ";
    pub const BADGE_PRIVATE: &'static str = "private";
    pub const CURSOR: &'static str = "▏";
    pub const SEPARATOR: &'static str = " │ ";

    // ─────────────────────────────────────────────────────────────────────
    // Pre-built styles
    // ─────────────────────────────────────────────────────────────────────

    pub fn text() -> Style {
        Style::default().fg(Self::GREY_100)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Self::GREY_300)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::GREY_400)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(Self::WHITE)
            .bg(Self::GREY_600)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::GREY_500)
    }

    /// Focused panel or field
    pub fn border_active() -> Style {
        Style::default().fg(Self::GREY_200)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::GREY_50)
            .add_modifier(Modifier::BOLD)
    }

    /// Keybinding highlight
    pub fn key() -> Style {
        Style::default().fg(Self::GREY_900).bg(Self::GREY_300)
    }

    pub fn spinner(frame: usize) -> char {
        Self::SPINNER_BRAILLE[frame % Self::SPINNER_BRAILLE.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_wraps() {
        assert_eq!(Theme::spinner(0), Theme::spinner(10));
        assert_ne!(Theme::spinner(0), Theme::spinner(1));
    }
}
