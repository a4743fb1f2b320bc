use crate::app::RuntimeContext;
use crate::app::{background, input::run_transition};
use crate::error::ClientError;
use crate::ui::{App, Overlay};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use url::Url;

/// Handle key events when an overlay is active
pub(super) fn handle_overlay_input(
    app: &mut App,
    key: KeyEvent,
    ctx: &RuntimeContext,
) -> Result<()> {
    match app.overlay {
        Overlay::Help { .. } => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => app.close_overlay(),
            KeyCode::Down | KeyCode::Char('j') => app.overlay_scroll(1),
            KeyCode::Up | KeyCode::Char('k') => app.overlay_scroll(-1),
            KeyCode::PageDown => app.overlay_scroll(10),
            KeyCode::PageUp => app.overlay_scroll(-10),
            _ => {}
        },
        Overlay::Picker { .. } => handle_picker_input(app, key, ctx),
        Overlay::Login { .. } => handle_login_input(app, key, ctx),
        Overlay::None => {}
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
//  PICKER
// ═══════════════════════════════════════════════════════════════════════════

fn handle_picker_input(app: &mut App, key: KeyEvent, ctx: &RuntimeContext) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_overlay(),
        KeyCode::Down | KeyCode::Char('j') => app.picker_move(1),
        KeyCode::Up | KeyCode::Char('k') => app.picker_move(-1),
        KeyCode::PageDown => app.picker_move(10),
        KeyCode::PageUp => app.picker_move(-10),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
            if app.picker_len() == 0 {
                return;
            }
            let selected = app.picker_selected();
            let outcome = if app.view().navigation.selected_repo().is_some() {
                app.controller.open_entry(selected)
            } else {
                app.controller.select_repository(selected).map(Some)
            };
            run_transition(app, ctx, outcome);
        }
        KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => {
            let outcome = app.controller.navigate_up();
            app.reset_picker_cursor();
            run_transition(app, ctx, outcome);
        }
        KeyCode::Char('r') => {
            let outcome = app.controller.refresh_repositories().map(Some);
            app.reset_picker_cursor();
            run_transition(app, ctx, outcome);
        }
        _ => {}
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOGIN
// ═══════════════════════════════════════════════════════════════════════════

fn login_input(app: &mut App) -> Option<&mut String> {
    match &mut app.overlay {
        Overlay::Login { input } => Some(input),
        _ => None,
    }
}

pub(super) fn handle_login_paste(app: &mut App, text: &str) {
    if let Some(input) = login_input(app) {
        input.push_str(text.trim());
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent, ctx: &RuntimeContext) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.close_overlay(),
        KeyCode::Char('o') if ctrl => open_login_page(app),
        KeyCode::Char('u') if ctrl => {
            if let Some(input) = login_input(app) {
                input.clear();
            }
        }
        KeyCode::Char(c) if !ctrl => {
            if let Some(input) = login_input(app) {
                input.push(c);
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = login_input(app) {
                input.pop();
            }
        }
        KeyCode::Enter => submit_callback(app, ctx),
        _ => {}
    }
}

fn open_login_page(app: &mut App) {
    let Some(url) = app.view().login_url.clone() else {
        app.show_toast("Login address not fetched yet");
        return;
    };
    if let Err(e) = open::that(&url) {
        tracing::warn!(error = %e, "couldn't open browser");
        app.show_toast("Browser launch failed; copy the address instead");
    }
}

fn submit_callback(app: &mut App, ctx: &RuntimeContext) {
    let raw = login_input(app).map(|s| s.trim().to_string()).unwrap_or_default();
    if raw.is_empty() {
        return;
    }
    let outcome = Url::parse(&raw)
        .map_err(|e| ClientError::SessionInvalid(format!("not an address: {}", e)))
        .and_then(|mut address| app.controller.accept_callback(&mut address));
    match outcome {
        Ok(effect) => {
            app.close_overlay();
            background::spawn_effect(ctx, effect);
        }
        Err(e) => app.show_error(&e),
    }
    app.sync_view();
}

#[cfg(test)]
mod tests {
    use crate::app::input::test_support::Harness;
    use crate::github::{EntryKind, TreeEntry};
    use crate::testing::FakeBackend;
    use crate::ui::Overlay;
    use crossterm::event::KeyCode;

    fn entry(name: &str, kind: EntryKind) -> TreeEntry {
        TreeEntry {
            name: name.into(),
            path: name.into(),
            kind,
            size: 10,
        }
    }

    fn backend() -> FakeBackend {
        FakeBackend::new()
            .with_user("42", "alice")
            .with_repos(vec![serde_json::from_str(
                r#"{"id": 1, "full_name": "alice/demo"}"#,
            )
            .unwrap()])
            .with_dir("alice/demo", "", vec![entry("a.py", EntryKind::File)])
            .with_file("alice/demo", "a.py", "print(1)")
    }

    async fn signed_in(h: &mut Harness) {
        h.app.overlay = Overlay::Login {
            input: String::new(),
        };
        h.type_str("http://localhost:3000/?github_user_id=42&github_login=alice");
        h.press(KeyCode::Enter);
        assert_eq!(h.app.overlay, Overlay::None);
        h.settle().await;
        assert!(h.app.view().signed_in());
    }

    #[tokio::test]
    async fn test_login_overlay_signs_in() {
        let mut h = Harness::new(backend());
        signed_in(&mut h).await;
        assert_eq!(
            h.app.view().identity.as_ref().map(|i| i.login.as_str()),
            Some("alice")
        );
    }

    #[test]
    fn test_login_overlay_rejects_garbage() {
        let mut h = Harness::new(backend());
        h.app.overlay = Overlay::Login {
            input: String::new(),
        };
        h.type_str("not a url");
        h.press(KeyCode::Enter);
        assert!(matches!(h.app.overlay, Overlay::Login { .. }));
        assert!(h.app.toast.as_ref().is_some_and(|t| t.is_error()));
        assert!(!h.app.view().signed_in());
    }

    #[tokio::test]
    async fn test_picker_selects_file_and_closes() {
        let mut h = Harness::new(backend());
        signed_in(&mut h).await;

        h.press(KeyCode::Char('g'));
        assert!(matches!(h.app.overlay, Overlay::Picker { .. }));
        h.settle().await;
        assert_eq!(h.app.view().repositories.len(), 1);

        h.press(KeyCode::Enter);
        h.settle().await;
        assert_eq!(h.app.view().navigation.current_entries().len(), 1);

        h.press(KeyCode::Enter);
        h.settle().await;
        assert_eq!(h.app.overlay, Overlay::None);
        assert_eq!(
            h.app.view().selected_file().map(|f| f.display()),
            Some("alice/demo:a.py".to_string())
        );
        assert_eq!(h.app.view().forms.code.text(), "print(1)");
    }

    #[tokio::test]
    async fn test_picker_backspace_returns_to_repo_list() {
        let mut h = Harness::new(backend());
        signed_in(&mut h).await;
        h.press(KeyCode::Char('g'));
        h.settle().await;
        h.press(KeyCode::Enter);
        h.settle().await;

        h.press(KeyCode::Backspace);
        assert!(h.app.view().navigation.selected_repo().is_none());
        assert!(matches!(h.app.overlay, Overlay::Picker { .. }));

        h.press(KeyCode::Esc);
        assert_eq!(h.app.overlay, Overlay::None);
        assert!(!h.app.view().picker_open);
    }
}
