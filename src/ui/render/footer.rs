use crate::ui::theme::Theme;
use crate::ui::{App, InputMode, Overlay};
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub(super) fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.view();
    let mut spans = vec![Span::styled("  ", Style::default())];

    if view.request.active || view.picker_loading() || view.resolving_identity {
        spans.push(Span::styled(
            format!("{} ", Theme::spinner(app.loading_frame)),
            Style::default().fg(Theme::YELLOW),
        ));
    }
    spans.push(Span::styled(
        truncate_to_width(&app.api_url, 40),
        Style::default().fg(Theme::GREY_400),
    ));
    if let Some(file) = view.selected_file() {
        spans.push(Span::styled(" ⎇ ", Style::default().fg(Theme::GREY_500)));
        spans.push(Span::styled(
            truncate_to_width(&file.display(), 40),
            Style::default().fg(Theme::GREEN),
        ));
    }

    let hints = key_hints(app);
    let status_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let hints_len: usize = hints
        .iter()
        .map(|(key, label)| key.chars().count() + label.chars().count() + 4)
        .sum();
    let spacer_len = (area.width as usize).saturating_sub(status_len + hints_len + 1);
    if spacer_len > 0 {
        spans.push(Span::raw(" ".repeat(spacer_len)));
    }

    for (key, label) in hints {
        spans.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Theme::GREY_900).bg(Theme::GREY_500),
        ));
        spans.push(Span::styled(
            format!(" {} ", label),
            Style::default().fg(Theme::GREY_500),
        ));
    }
    spans.push(Span::raw(" "));

    let footer = Paragraph::new(vec![Line::from(""), Line::from(spans)])
        .style(Style::default().bg(Theme::GREY_900));
    frame.render_widget(footer, area);
}

/// Key hints for whatever currently has the keyboard.
fn key_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    if let InputMode::Editing(field) = app.input_mode {
        let mut hints = vec![("Esc", "done"), ("^U", "clear")];
        if matches!(
            field,
            crate::workflow::FormField::Code
                | crate::workflow::FormField::ErrorLogs
                | crate::workflow::FormField::Idea
        ) {
            hints.insert(1, ("↵", "newline"));
        }
        return hints;
    }

    match app.overlay {
        Overlay::Help { .. } => vec![("↑↓", "scroll"), ("Esc", "close")],
        Overlay::Picker { .. } => vec![
            ("↵", "open"),
            ("⌫", "up"),
            ("r", "refresh"),
            ("Esc", "close"),
        ],
        Overlay::Login { .. } => vec![("↵", "sign in"), ("^O", "browser"), ("Esc", "cancel")],
        Overlay::None => {
            let view = app.view();
            let mut hints = vec![("↵", "edit")];
            if view.request.active {
                hints.push(("c", "cancel"));
            } else {
                hints.push(("s", "submit"));
            }
            if view.tab.accepts_code() {
                hints.push(("g", "github"));
            }
            if view.signed_in() {
                hints.push(("L", "logout"));
            } else {
                hints.push(("l", "login"));
            }
            hints.push(("?", "help"));
            hints.push(("q", "quit"));
            hints
        }
    }
}
