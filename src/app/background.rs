//! Background task handling
//!
//! Network effects run as tokio tasks and report back over an mpsc channel;
//! the UI loop drains it every frame.
//!
//! Channel sends use `let _ =`: the receiver only goes away during shutdown,
//! when nobody is waiting for the answer.

use crate::app::messages::BackgroundMessage;
use crate::app::RuntimeContext;
use crate::backend::DispatchReply;
use crate::browser::{BrowserRequest, BrowserResponse};
use crate::controller::{self, Completion, Effect};
use crate::error::ClientError;
use crate::ui::{App, Overlay};
use crate::util::truncate;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{mpsc, Arc};

pub fn drain_messages(app: &mut App, rx: &mpsc::Receiver<BackgroundMessage>, ctx: &RuntimeContext) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            BackgroundMessage::Completed(completion) => apply_completion(app, completion, ctx),
            BackgroundMessage::Error(e) => {
                tracing::error!(error = %e, "background task failed");
                app.show_toast(&format!("Error: {}", truncate(&e, 80)));
            }
        }
    }
    app.sync_view();
}

fn apply_completion(app: &mut App, completion: Completion, ctx: &RuntimeContext) {
    match &completion {
        Completion::LoginUrl(Ok(url)) if ctx.open_browser => {
            let url = url.clone();
            apply_and_report(app, completion);
            match open::that(&url) {
                Ok(()) => app.show_toast("+ Opened GitHub in your browser"),
                Err(e) => {
                    tracing::warn!(error = %e, "couldn't open browser");
                    app.show_toast("Browser launch failed; open the address shown instead");
                }
            }
        }
        Completion::Identity { result: Ok(identity), .. } => {
            let message = format!("+ Signed in as {}", identity.login);
            if apply_and_report(app, completion) {
                app.show_toast(&message);
            }
        }
        Completion::Identity { result: Err(_), .. } => {
            // The error toast says why; the controller has already signed out
            apply_and_report(app, completion);
        }
        Completion::Browse { .. } => {
            let before = app.controller.snapshot();
            apply_and_report(app, completion);
            let after = app.controller.snapshot();
            if before.navigation != after.navigation || before.repositories != after.repositories {
                app.reset_picker_cursor();
            }
        }
        _ => {
            apply_and_report(app, completion);
        }
    }

    // Picker closes itself once a file lands
    app.sync_view();
    if matches!(app.overlay, Overlay::Picker { .. }) && !app.view().picker_open {
        app.close_overlay();
    }
}

/// Apply and toast any error. Returns whether it succeeded.
fn apply_and_report(app: &mut App, completion: Completion) -> bool {
    match app.controller.apply(completion) {
        Ok(()) => true,
        Err(e) => {
            app.show_error(&e);
            false
        }
    }
}

/// Start an effect in the background.
pub fn spawn_effect(ctx: &RuntimeContext, effect: Effect) {
    let backend = Arc::clone(ctx.backend);
    let tx = ctx.tx.clone();
    let task_name = effect.name();
    let fallback = fallback_completion(&effect);

    spawn_background(ctx.tx.clone(), task_name, Some(fallback), async move {
        let completion = controller::run_effect(backend.as_ref(), effect).await;
        let _ = tx.send(BackgroundMessage::Completed(completion));
    });
}

/// What to report if the task running `effect` dies, so the controller never
/// waits forever on an answer.
pub fn fallback_completion(effect: &Effect) -> Completion {
    let crashed = || ClientError::Fetch("background task crashed".to_string());
    match effect {
        Effect::FetchLoginUrl => Completion::LoginUrl(Err(crashed())),
        Effect::ResolveIdentity(session) => Completion::Identity {
            session: session.clone(),
            result: Err(ClientError::SessionInvalid("background task crashed".to_string())),
        },
        Effect::Browse { request, .. } => Completion::Browse {
            request: request.clone(),
            response: match request {
                BrowserRequest::ListRepositories => BrowserResponse::Repositories(Err(crashed())),
                BrowserRequest::ListDirectory { .. } => BrowserResponse::Directory(Err(crashed())),
            },
        },
        Effect::ReadFile(request) => Completion::File {
            request: request.clone(),
            result: Err(crashed()),
        },
        Effect::Dispatch(ticket) => Completion::Dispatch {
            seq: ticket.seq,
            reply: DispatchReply::Unreachable,
        },
    }
}

pub fn spawn_background<F>(
    tx: mpsc::Sender<BackgroundMessage>,
    task_name: &'static str,
    fallback: Option<Completion>,
    fut: F,
) where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
            let detail = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            let _ = tx.send(BackgroundMessage::Error(format!(
                "Background task '{}' crashed unexpectedly: {}",
                task_name, detail
            )));
            if let Some(completion) = fallback {
                let _ = tx.send(BackgroundMessage::Completed(completion));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::session::{Session, SessionStore};
    use crate::testing::FakeBackend;
    use crate::workflow::FormField;
    use std::time::Duration;

    struct Harness {
        backend: Arc<dyn Backend>,
        store: Arc<SessionStore>,
        tx: mpsc::Sender<BackgroundMessage>,
        rx: mpsc::Receiver<BackgroundMessage>,
    }

    impl Harness {
        fn new(backend: FakeBackend) -> Self {
            let (tx, rx) = mpsc::channel();
            Self {
                backend: Arc::new(backend),
                store: Arc::new(SessionStore::in_memory()),
                tx,
                rx,
            }
        }

        fn ctx(&self) -> RuntimeContext<'_> {
            RuntimeContext {
                backend: &self.backend,
                tx: &self.tx,
                open_browser: false,
            }
        }

        async fn recv(&self) -> BackgroundMessage {
            for _ in 0..200 {
                if let Ok(msg) = self.rx.try_recv() {
                    return msg;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            panic!("no background message arrived");
        }
    }

    #[test]
    fn test_fallback_for_dispatch_unblocks() {
        let mut app = App::headless(Arc::new(SessionStore::in_memory()));
        app.controller.edit_field(FormField::Code, "x".into());
        let effect = app.controller.submit().unwrap();

        app.controller.apply(fallback_completion(&effect)).unwrap();
        app.sync_view();
        assert!(!app.view().request.active);
        assert!(app.view().can_submit);
    }

    #[test]
    fn test_fallback_for_browse_matches_request() {
        let effect = Effect::Browse {
            session: Session::new("42"),
            request: BrowserRequest::ListRepositories,
        };
        assert!(matches!(
            fallback_completion(&effect),
            Completion::Browse {
                request: BrowserRequest::ListRepositories,
                response: BrowserResponse::Repositories(Err(_)),
            }
        ));
    }

    #[tokio::test]
    async fn test_spawned_effect_reports_back() {
        let harness = Harness::new(FakeBackend::new().with_user("42", "alice"));
        let mut app = App::headless(Arc::clone(&harness.store));
        let mut address =
            url::Url::parse("http://localhost:3000/?github_user_id=42&github_login=alice").unwrap();
        let effect = app.controller.accept_callback(&mut address).unwrap();

        spawn_effect(&harness.ctx(), effect);
        let msg = harness.recv().await;
        let BackgroundMessage::Completed(completion) = msg else {
            panic!("expected a completion");
        };
        apply_completion(&mut app, completion, &harness.ctx());

        assert_eq!(app.view().identity.as_ref().map(|i| i.login.as_str()), Some("alice"));
        assert!(app.toast.as_ref().is_some_and(|t| t.message.contains("alice")));
    }

    #[tokio::test]
    async fn test_panicking_task_sends_error_then_fallback() {
        let harness = Harness::new(FakeBackend::new());
        let fallback = Completion::Dispatch {
            seq: 1,
            reply: DispatchReply::Unreachable,
        };
        spawn_background(harness.tx.clone(), "boom", Some(fallback), async {
            panic!("kaboom");
        });

        let BackgroundMessage::Error(e) = harness.recv().await else {
            panic!("expected an error first");
        };
        assert!(e.contains("boom") && e.contains("kaboom"));
        assert!(matches!(
            harness.recv().await,
            BackgroundMessage::Completed(Completion::Dispatch { seq: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_rejected_identity_logs_out_with_toast() {
        let harness = Harness::new(FakeBackend::new());
        let mut app = App::headless(Arc::clone(&harness.store));
        let mut address =
            url::Url::parse("http://localhost:3000/?github_user_id=9&github_login=bob").unwrap();
        let effect = app.controller.accept_callback(&mut address).unwrap();

        spawn_effect(&harness.ctx(), effect);
        drain_after(&mut app, &harness).await;

        assert!(!app.view().signed_in());
        assert!(app.toast.as_ref().is_some_and(|t| t.is_error()));
        assert_eq!(harness.store.persisted_token(), None);
    }

    #[test]
    fn test_cursor_only_moves_when_listing_changes() {
        let harness = Harness::new(FakeBackend::new());
        let mut app = App::headless(Arc::clone(&harness.store));
        let mut address =
            url::Url::parse("http://localhost:3000/?github_user_id=42&github_login=alice").unwrap();
        app.controller.accept_callback(&mut address).unwrap();
        app.controller.open_picker().unwrap();
        app.overlay = Overlay::Picker { selected: 2 };

        let repo: crate::github::RepositoryRef =
            serde_json::from_value(serde_json::json!({"id": 3, "full_name": "alice/old"})).unwrap();
        let stale = Completion::Browse {
            request: BrowserRequest::ListDirectory {
                repo: repo.clone(),
                segments: vec![],
            },
            response: BrowserResponse::Directory(Ok(vec![])),
        };
        apply_completion(&mut app, stale, &harness.ctx());
        assert!(matches!(app.overlay, Overlay::Picker { selected: 2 }));

        let answer = Completion::Browse {
            request: BrowserRequest::ListRepositories,
            response: BrowserResponse::Repositories(Ok(vec![repo])),
        };
        apply_completion(&mut app, answer, &harness.ctx());
        assert!(matches!(app.overlay, Overlay::Picker { selected: 0 }));
    }

    async fn drain_after(app: &mut App, harness: &Harness) {
        let msg = harness.recv().await;
        harness.tx.send(msg).ok();
        drain_messages(app, &harness.rx, &harness.ctx());
    }
}
