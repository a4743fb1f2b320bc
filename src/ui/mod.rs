//! codeassist UI
//!
//! Layout:
//! ╔══════════════════════════════════════════════════════════════╗
//! ║  codeassist                                 alice · Keychain ║
//! ║  Code Review │ Generate Tests │ Bug Analysis │ Project Ideas ║
//! ╠═══════════════════════════╦══════════════════════════════════╣
//! ║  Language  python         ║  RESULT                          ║
//! ║  Code      alice/demo:a.py║  ## Summary                      ║
//! ║  Context                  ║  The function ...                ║
//! ╠═══════════════════════════╩══════════════════════════════════╣
//! ║  ↵ edit  s submit  g github  ? help  q quit                  ║
//! ╚══════════════════════════════════════════════════════════════╝
//!
//! The UI never owns client state. It renders the latest [`Snapshot`] and
//! turns keys into controller transitions.

pub mod helpers;
pub mod render;
pub mod theme;

pub use render::render;

use crate::controller::{Controller, Snapshot};
use crate::error::ClientError;
use crate::workflow::FormField;
use std::time::Instant;
use tokio::sync::watch;

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into a form field
    Editing(FormField),
}

/// Overlay state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Help {
        scroll: usize,
    },
    /// GitHub repository / file picker
    Picker {
        selected: usize,
    },
    /// Login: shows the authorization address and takes the pasted callback
    Login {
        input: String,
    },
}

/// Toast notification kind - affects duration and styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

impl ToastKind {
    /// Duration in seconds before toast expires
    pub fn duration_secs(&self) -> u64 {
        match self {
            ToastKind::Info => 3,
            ToastKind::Success => 3,
            ToastKind::Error => 10, // Errors stay longer
        }
    }
}

/// Toast notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub created_at: Instant,
    pub kind: ToastKind,
}

impl Toast {
    pub fn new(message: &str) -> Self {
        // Success indicators are checked before error keywords
        let kind = if message.starts_with('+') {
            ToastKind::Success
        } else if message.contains("failed")
            || message.contains("error")
            || message.contains("Error")
        {
            ToastKind::Error
        } else {
            ToastKind::Info
        };
        Self::with_kind(message, kind)
    }

    pub fn with_kind(message: &str, kind: ToastKind) -> Self {
        Self {
            message: message.to_string(),
            created_at: Instant::now(),
            kind,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed().as_secs() >= self.kind.duration_secs()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, ToastKind::Error)
    }
}

pub struct App {
    pub controller: Controller,
    snapshot_rx: watch::Receiver<Snapshot>,
    view: Snapshot,
    pub overlay: Overlay,
    pub input_mode: InputMode,
    /// Focused field within the active workflow's form
    pub focus: usize,
    pub result_scroll: u16,
    pub toast: Option<Toast>,
    pub loading_frame: usize,
    pub should_quit: bool,
    /// Backend address, for the header
    pub api_url: String,
    /// Where the session token is kept, for the header
    pub store_label: &'static str,
}

impl App {
    pub fn new(controller: Controller, api_url: String) -> Self {
        let snapshot_rx = controller.subscribe();
        let view = controller.snapshot();
        let store_label = controller.store().backend_label();
        Self {
            controller,
            snapshot_rx,
            view,
            overlay: Overlay::None,
            input_mode: InputMode::Normal,
            focus: 0,
            result_scroll: 0,
            toast: None,
            loading_frame: 0,
            should_quit: false,
            api_url,
            store_label,
        }
    }

    #[cfg(test)]
    pub fn headless(store: std::sync::Arc<crate::session::SessionStore>) -> Self {
        Self::new(Controller::new(store), crate::config::DEFAULT_API_URL.to_string())
    }

    /// Latest published state
    pub fn view(&self) -> &Snapshot {
        &self.view
    }

    /// Pick up whatever the controller published since the last frame.
    pub fn sync_view(&mut self) {
        if self.snapshot_rx.has_changed().unwrap_or(false) {
            self.view = self.snapshot_rx.borrow_and_update().clone();
        }
        let fields = self.view.tab.fields().len();
        if self.focus >= fields {
            self.focus = fields.saturating_sub(1);
        }
    }

    pub fn focused_field(&self) -> FormField {
        let fields = self.view.tab.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        let len = self.view.tab.fields().len();
        self.focus = (self.focus + 1) % len;
    }

    pub fn focus_prev(&mut self) {
        let len = self.view.tab.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    /// Tick the loading animation
    pub fn tick_loading(&mut self) {
        if self.view.request.active || self.view.picker_loading() || self.view.resolving_identity {
            self.loading_frame = self.loading_frame.wrapping_add(1);
        }
    }

    pub fn scroll_result(&mut self, delta: i32) {
        let next = self.result_scroll as i32 + delta;
        self.result_scroll = next.max(0) as u16;
    }

    // ═══════════════════════════════════════════════════════════════════════
    //  OVERLAYS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn close_overlay(&mut self) {
        if matches!(self.overlay, Overlay::Picker { .. }) {
            self.controller.close_picker();
        }
        self.overlay = Overlay::None;
    }

    pub fn open_help(&mut self) {
        self.overlay = Overlay::Help { scroll: 0 };
    }

    pub fn overlay_scroll(&mut self, delta: i32) {
        if let Overlay::Help { scroll } = &mut self.overlay {
            *scroll = (*scroll as i32 + delta).max(0) as usize;
        }
    }

    /// Number of rows the picker currently lists
    pub fn picker_len(&self) -> usize {
        if self.view.navigation.selected_repo().is_some() {
            self.view.navigation.current_entries().len()
        } else {
            self.view.repositories.len()
        }
    }

    pub fn picker_move(&mut self, delta: i32) {
        let len = self.picker_len();
        if let Overlay::Picker { selected } = &mut self.overlay {
            if len == 0 {
                *selected = 0;
                return;
            }
            let next = (*selected as i32 + delta).clamp(0, len as i32 - 1);
            *selected = next as usize;
        }
    }

    pub fn picker_selected(&self) -> usize {
        match self.overlay {
            Overlay::Picker { selected } => selected,
            _ => 0,
        }
    }

    /// Listing changed under the cursor
    pub fn reset_picker_cursor(&mut self) {
        if let Overlay::Picker { selected } = &mut self.overlay {
            *selected = 0;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    //  TOASTS
    // ═══════════════════════════════════════════════════════════════════════

    /// Clear expired toast
    pub fn clear_expired_toast(&mut self) {
        if let Some(ref toast) = self.toast {
            if toast.is_expired() {
                self.toast = None;
            }
        }
    }

    /// Show a toast message (errors and success messages are displayed)
    pub fn show_toast(&mut self, message: &str) {
        let toast = Toast::new(message);
        if toast.is_error() || matches!(toast.kind, ToastKind::Success) {
            self.toast = Some(toast);
        }
        // Info toasts are silently ignored
    }

    pub fn show_error(&mut self, err: &ClientError) {
        tracing::debug!(error = %err, "surfacing error");
        self.toast = Some(Toast::with_kind(&err.user_message(), ToastKind::Error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use crate::workflow::WorkflowKind;
    use std::sync::Arc;

    fn app() -> App {
        App::headless(Arc::new(SessionStore::in_memory()))
    }

    #[test]
    fn test_toast_classification() {
        assert_eq!(Toast::new("+ Signed in as alice").kind, ToastKind::Success);
        assert_eq!(Toast::new("Fetch failed: 500").kind, ToastKind::Error);
        assert_eq!(Toast::new("Picker opened").kind, ToastKind::Info);
    }

    #[test]
    fn test_info_toasts_are_dropped() {
        let mut app = app();
        app.show_toast("just so you know");
        assert!(app.toast.is_none());
        app.show_error(&ClientError::NoSession);
        assert!(app.toast.as_ref().is_some_and(|t| t.is_error()));
    }

    #[test]
    fn test_sync_view_follows_controller() {
        let mut app = app();
        app.controller.edit_field(FormField::Code, "let x = 1;".into());
        assert_eq!(app.view().forms.code.text(), "", "not synced yet");
        app.sync_view();
        assert_eq!(app.view().forms.code.text(), "let x = 1;");
    }

    #[test]
    fn test_focus_clamped_on_tab_switch() {
        let mut app = app();
        app.focus = 2;
        app.controller.set_tab(WorkflowKind::ProjectIdea);
        app.sync_view();
        assert_eq!(app.focus, 0);
        assert_eq!(app.focused_field(), FormField::Idea);
    }

    #[test]
    fn test_focus_wraps() {
        let mut app = app();
        app.focus_prev();
        assert_eq!(app.focused_field(), FormField::Context);
        app.focus_next();
        assert_eq!(app.focused_field(), FormField::Language);
    }

    #[test]
    fn test_picker_cursor_clamps_to_listing() {
        let mut app = app();
        app.overlay = Overlay::Picker { selected: 0 };
        app.picker_move(5);
        assert_eq!(app.picker_selected(), 0, "empty listing");
    }
}
