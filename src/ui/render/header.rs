use crate::ui::theme::Theme;
use crate::ui::App;
use crate::workflow::WorkflowKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub(super) fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1), // Logo / identity
            Constraint::Length(1), // Tabs
            Constraint::Length(1),
        ])
        .split(area);

    let logo = Line::from(vec![
        Span::styled(
            format!("   {}", Theme::LOGO),
            Style::default()
                .fg(Theme::WHITE)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("   {}", Theme::TAGLINE), Theme::text_dim()),
    ]);
    frame.render_widget(Paragraph::new(logo), rows[1]);
    frame.render_widget(
        Paragraph::new(identity_line(app)).alignment(ratatui::layout::Alignment::Right),
        rows[1],
    );

    let mut tabs = vec![Span::raw("   ")];
    for (i, kind) in WorkflowKind::ALL.iter().enumerate() {
        if i > 0 {
            tabs.push(Span::styled(Theme::SEPARATOR, Theme::text_dim()));
        }
        let style = if *kind == app.view().tab {
            Theme::selected()
        } else {
            Theme::text_muted()
        };
        tabs.push(Span::styled(format!(" {} {} ", i + 1, kind.label()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(tabs)), rows[2]);
}

fn identity_line(app: &App) -> Line<'static> {
    let view = app.view();
    let who = match (&view.identity, view.resolving_identity, view.signed_in()) {
        (Some(identity), _, _) if identity.display_name() != identity.login => Span::styled(
            format!("{} (@{})", identity.display_name(), identity.login),
            Theme::text(),
        ),
        (Some(identity), _, _) => Span::styled(format!("@{}", identity.login), Theme::text()),
        (None, true, _) => Span::styled(
            format!("{} checking session", Theme::spinner(app.loading_frame)),
            Theme::text_muted(),
        ),
        (None, false, true) => Span::styled("signed in", Theme::text_muted()),
        (None, false, false) => Span::styled("not signed in · l to log in", Theme::text_dim()),
    };
    Line::from(vec![
        who,
        Span::styled(format!("  {}   ", app.store_label), Theme::text_dim()),
    ])
}
