use crate::app::input::run_transition;
use crate::app::{background, RuntimeContext};
use crate::ui::{App, InputMode, Overlay};
use crate::workflow::WorkflowKind;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

/// Handle key events on the form, with no overlay open
pub(super) fn handle_normal_mode(app: &mut App, key: KeyEvent, ctx: &RuntimeContext) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => {
            let next = app.view().tab.next();
            switch_tab(app, next);
        }
        KeyCode::BackTab => {
            let prev = app.view().tab.prev();
            switch_tab(app, prev);
        }
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            switch_tab(app, WorkflowKind::ALL[idx]);
        }
        KeyCode::Down | KeyCode::Char('j') => app.focus_next(),
        KeyCode::Up | KeyCode::Char('k') => app.focus_prev(),
        KeyCode::Left | KeyCode::Char('h') => {
            let field = app.focused_field();
            app.controller.cycle_choice(field, false);
        }
        KeyCode::Right => {
            let field = app.focused_field();
            app.controller.cycle_choice(field, true);
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            let field = app.focused_field();
            if field.choices().is_some() {
                app.controller.cycle_choice(field, true);
            } else {
                app.input_mode = InputMode::Editing(field);
            }
        }
        KeyCode::Char('s') => match app.controller.submit() {
            Ok(effect) => {
                app.result_scroll = 0;
                background::spawn_effect(ctx, effect);
            }
            Err(e) => app.show_error(&e),
        },
        KeyCode::Char('c') => {
            if app.view().request.active {
                app.controller.cancel_dispatch();
                app.show_toast("+ Stopped waiting; a late result will be ignored");
            }
        }
        KeyCode::Char('g') => {
            let outcome = app.controller.open_picker();
            if outcome.is_ok() {
                app.overlay = Overlay::Picker { selected: 0 };
            }
            run_transition(app, ctx, outcome);
        }
        KeyCode::Char('x') => {
            if app.view().selected_file().is_some() {
                app.controller.clear_selection();
            }
        }
        KeyCode::Char('l') => {
            let effect = app.controller.request_login();
            app.overlay = Overlay::Login {
                input: String::new(),
            };
            background::spawn_effect(ctx, effect);
        }
        KeyCode::Char('L') => {
            if app.view().signed_in() {
                app.controller.logout();
                app.show_toast("+ Logged out");
            }
        }
        KeyCode::Char('?') => app.open_help(),
        KeyCode::PageDown => app.scroll_result(10),
        KeyCode::PageUp => app.scroll_result(-10),
        _ => {}
    }
    app.sync_view();
    Ok(())
}

fn switch_tab(app: &mut App, kind: WorkflowKind) {
    app.controller.set_tab(kind);
    app.focus = 0;
    app.result_scroll = 0;
}

#[cfg(test)]
mod tests {
    use crate::app::input::test_support::Harness;
    use crate::backend::DispatchReply;
    use crate::testing::FakeBackend;
    use crate::ui::{InputMode, Overlay};
    use crate::workflow::{FormField, WorkflowKind};
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_number_keys_switch_tabs() {
        let mut h = Harness::new(FakeBackend::new());
        h.press(KeyCode::Char('4'));
        assert_eq!(h.app.view().tab, WorkflowKind::ProjectIdea);
        h.press(KeyCode::Tab);
        assert_eq!(h.app.view().tab, WorkflowKind::CodeReview);
        h.press(KeyCode::BackTab);
        assert_eq!(h.app.view().tab, WorkflowKind::ProjectIdea);
    }

    #[test]
    fn test_enter_cycles_choice_or_starts_editing() {
        let mut h = Harness::new(FakeBackend::new());
        assert_eq!(h.app.focused_field(), FormField::Language);
        h.press(KeyCode::Enter);
        assert_eq!(h.app.view().forms.language, "javascript");
        assert_eq!(h.app.input_mode, InputMode::Normal);

        h.press(KeyCode::Down);
        h.press(KeyCode::Enter);
        assert_eq!(h.app.input_mode, InputMode::Editing(FormField::Code));
    }

    #[test]
    fn test_submit_without_input_shows_error() {
        let mut h = Harness::new(FakeBackend::new());
        h.press(KeyCode::Char('s'));
        assert!(!h.app.view().request.active);
        assert!(h.app.toast.as_ref().is_some_and(|t| t.is_error()));
    }

    #[test]
    fn test_picker_needs_login() {
        let mut h = Harness::new(FakeBackend::new());
        h.press(KeyCode::Char('g'));
        assert_eq!(h.app.overlay, Overlay::None);
        assert!(h.app.toast.as_ref().is_some_and(|t| t.is_error()));
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let mut h = Harness::new(
            FakeBackend::new().with_reply(DispatchReply::Result("## Summary\nLooks fine".into())),
        );
        h.press(KeyCode::Char('4'));
        h.press(KeyCode::Enter);
        h.type_str("a recipe planner");
        h.press(KeyCode::Esc);
        h.press(KeyCode::Char('s'));
        assert!(h.app.view().request.active);
        assert!(!h.app.view().can_submit);

        h.settle().await;
        let request = &h.app.view().request;
        assert!(!request.active);
        assert_eq!(request.result_text, "## Summary\nLooks fine");
        assert_eq!(request.succeeded, Some(true));
    }

    #[tokio::test]
    async fn test_cancel_ignores_late_result() {
        let mut h = Harness::new(FakeBackend::new());
        h.press(KeyCode::Down);
        h.press(KeyCode::Enter);
        h.type_str("print(1)");
        h.press(KeyCode::Esc);
        h.press(KeyCode::Char('s'));
        h.press(KeyCode::Char('c'));
        assert!(!h.app.view().request.active);

        h.settle().await;
        assert_eq!(h.app.view().request.result_text, "");
    }

    #[tokio::test]
    async fn test_login_key_fetches_address() {
        let mut h = Harness::new(FakeBackend::new());
        h.press(KeyCode::Char('l'));
        assert!(matches!(h.app.overlay, Overlay::Login { .. }));
        h.settle().await;
        assert!(h.app.view().login_url.is_some());
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut h = Harness::new(FakeBackend::new());
        h.app.input_mode = InputMode::Editing(FormField::Code);
        h.press_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(h.app.should_quit);
    }
}
