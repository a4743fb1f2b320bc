use crate::ui::theme::Theme;
use crate::ui::{Toast, ToastKind};
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Marker, background and message style per kind
fn toast_style(kind: ToastKind) -> (&'static str, Color, Style) {
    match kind {
        ToastKind::Success => (
            " + ",
            Theme::GREEN,
            Style::default()
                .fg(Theme::WHITE)
                .add_modifier(Modifier::BOLD),
        ),
        ToastKind::Error => (" x ", Theme::RED, Style::default().fg(Theme::WHITE)),
        ToastKind::Info => (
            " › ",
            Theme::GREY_700,
            Style::default()
                .fg(Theme::GREY_100)
                .add_modifier(Modifier::ITALIC),
        ),
    }
}

/// One line, centered just above the footer. Only the first line of a
/// multi-line message is shown; the full text is in the log.
pub(super) fn render_toast(frame: &mut Frame, toast: &Toast) {
    let area = frame.area();
    let (marker, bg, text_style) = toast_style(toast.kind);

    let first_line = toast
        .message
        .trim_start_matches('+')
        .trim_start()
        .lines()
        .next()
        .unwrap_or("");
    let room = (area.width as usize).saturating_sub(marker.width() + 6);
    let message = truncate_to_width(first_line, room);

    let width = ((marker.width() + message.width() + 2) as u16).min(area.width);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(5),
        width,
        height: 1,
    };
    frame.render_widget(Clear, toast_area);

    let line = Line::from(vec![
        Span::styled(marker, Style::default().fg(Theme::WHITE).bg(bg)),
        Span::styled(format!("{} ", message), text_style),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), toast_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_long_toast_fits_narrow_terminal() {
        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        let toast = Toast::with_kind(&"x".repeat(200), ToastKind::Error);
        terminal.draw(|f| render_toast(f, &toast)).unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..30).map(|x| buffer[(x, 5)].symbol().to_string()).collect();
        assert!(row.contains("..."));
    }

    #[test]
    fn test_success_marker_replaces_plus() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let toast = Toast::new("+ Logged out");
        terminal.draw(|f| render_toast(f, &toast)).unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..40).map(|x| buffer[(x, 5)].symbol().to_string()).collect();
        assert!(row.contains("+ Logged out"));
        assert_eq!(row.matches('+').count(), 1);
    }
}
