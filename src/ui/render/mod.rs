mod footer;
mod header;
mod main;
mod overlays;
mod toast;

use crate::ui::theme::Theme;
use crate::ui::{App, Overlay};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

use footer::render_footer;
use header::render_header;
use main::render_main;
use overlays::{render_help, render_login, render_picker};
use toast::render_toast;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Clear with dark background
    frame.render_widget(Block::default().style(Style::default().bg(Theme::BG)), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header (logo + tabs)
            Constraint::Min(10),   // Form and result
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(frame, layout[0], app);
    render_main(frame, layout[1], app);
    render_footer(frame, layout[2], app);

    match &app.overlay {
        Overlay::Help { scroll } => render_help(frame, *scroll),
        Overlay::Picker { selected } => render_picker(frame, app, *selected),
        Overlay::Login { input } => render_login(frame, app, input),
        Overlay::None => {}
    }

    if let Some(toast) = &app.toast {
        render_toast(frame, toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::workflow::{FormField, WorkflowKind};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_renders_tabs_and_form() {
        let app = App::headless(Arc::new(SessionStore::in_memory()));
        let screen = draw(&app);
        for kind in WorkflowKind::ALL {
            assert!(screen.contains(kind.label()), "missing tab {}", kind.label());
        }
        assert!(screen.contains("Language"));
        assert!(screen.contains("auto-detect"));
        assert!(screen.contains("not signed in"));
    }

    #[test]
    fn test_renders_result_text() {
        let mut app = App::headless(Arc::new(SessionStore::in_memory()));
        app.controller.edit_field(FormField::Code, "print(1)".into());
        let effect = app.controller.submit().unwrap();
        let crate::controller::Effect::Dispatch(ticket) = effect else {
            panic!("expected a dispatch");
        };
        app.controller
            .apply(crate::controller::Completion::Dispatch {
                seq: ticket.seq,
                reply: crate::backend::DispatchReply::Detail("rate limited".into()),
            })
            .unwrap();
        app.sync_view();
        assert!(draw(&app).contains("rate limited"));
    }

    #[test]
    fn test_renders_overlays_without_panicking() {
        let mut app = App::headless(Arc::new(SessionStore::in_memory()));
        app.overlay = Overlay::Help { scroll: 0 };
        assert!(draw(&app).contains("Workflows"));
        app.overlay = Overlay::Picker { selected: 0 };
        draw(&app);
        app.overlay = Overlay::Login {
            input: "http://localhost:3000/?github_user_id=1".into(),
        };
        assert!(draw(&app).contains("github_user_id=1"));
    }
}
