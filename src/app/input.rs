//! Input handling
//!
//! Keys go to the field being edited first, then to an open overlay, then to
//! the form. Anything that needs the network comes back from the controller
//! as an effect and is started with [`background::spawn_effect`].

use crate::app::background;
use crate::app::RuntimeContext;
use crate::controller::Effect;
use crate::error::ClientError;
use crate::ui::{App, InputMode, Overlay};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

mod edit;
mod normal;
mod overlay;

use edit::{handle_edit_input, handle_edit_paste};
use normal::handle_normal_mode;
use overlay::{handle_login_paste, handle_overlay_input};

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN INPUT DISPATCHER
// ═══════════════════════════════════════════════════════════════════════════

/// Main key event handler - dispatches to mode-specific handlers
pub fn handle_key_event(app: &mut App, key: KeyEvent, ctx: &RuntimeContext) -> Result<()> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    if let InputMode::Editing(field) = app.input_mode {
        return handle_edit_input(app, field, key);
    }

    if app.overlay != Overlay::None {
        return handle_overlay_input(app, key, ctx);
    }

    handle_normal_mode(app, key, ctx)
}

/// Bracketed paste: the whole clipboard arrives at once.
pub fn handle_paste(app: &mut App, text: &str) {
    if let InputMode::Editing(field) = app.input_mode {
        handle_edit_paste(app, field, text);
    } else if matches!(app.overlay, Overlay::Login { .. }) {
        handle_login_paste(app, text);
    }
}

/// Start the effect a transition asked for, or surface why it was refused.
fn run_transition(app: &mut App, ctx: &RuntimeContext, outcome: Result<Option<Effect>, ClientError>) {
    match outcome {
        Ok(Some(effect)) => background::spawn_effect(ctx, effect),
        Ok(None) => {}
        Err(e) => app.show_error(&e),
    }
    app.sync_view();
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::app::{BackgroundMessage, RuntimeContext};
    use crate::backend::Backend;
    use crate::session::SessionStore;
    use crate::testing::FakeBackend;
    use crate::ui::App;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    pub struct Harness {
        pub backend: Arc<dyn Backend>,
        pub store: Arc<SessionStore>,
        pub tx: mpsc::Sender<BackgroundMessage>,
        pub rx: mpsc::Receiver<BackgroundMessage>,
        pub app: App,
    }

    impl Harness {
        pub fn new(backend: FakeBackend) -> Self {
            let (tx, rx) = mpsc::channel();
            let store = Arc::new(SessionStore::in_memory());
            Self {
                backend: Arc::new(backend),
                app: App::headless(Arc::clone(&store)),
                store,
                tx,
                rx,
            }
        }

        pub fn press(&mut self, code: KeyCode) {
            self.press_with(code, KeyModifiers::NONE);
        }

        pub fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) {
            let ctx = RuntimeContext {
                backend: &self.backend,
                tx: &self.tx,
                open_browser: false,
            };
            super::handle_key_event(&mut self.app, KeyEvent::new(code, modifiers), &ctx)
                .unwrap();
            self.app.sync_view();
        }

        pub fn type_str(&mut self, text: &str) {
            for c in text.chars() {
                self.press(KeyCode::Char(c));
            }
        }

        /// Wait for the next background message and fold it in.
        pub async fn settle(&mut self) {
            for _ in 0..200 {
                if let Ok(msg) = self.rx.try_recv() {
                    self.tx.send(msg).ok();
                    let ctx = RuntimeContext {
                        backend: &self.backend,
                                tx: &self.tx,
                        open_browser: false,
                    };
                    crate::app::background::drain_messages(&mut self.app, &self.rx, &ctx);
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            panic!("no background message arrived");
        }
    }
}
