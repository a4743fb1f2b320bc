pub mod background;
pub mod input;
pub mod messages;
pub mod runtime;

pub use messages::BackgroundMessage;
pub use runtime::run_tui;

use crate::backend::Backend;
use std::sync::mpsc;
use std::sync::Arc;

/// Handles background work needs, borrowed for the life of the event loop.
pub struct RuntimeContext<'a> {
    pub backend: &'a Arc<dyn Backend>,
    pub tx: &'a mpsc::Sender<BackgroundMessage>,
    /// Open the GitHub authorization page automatically
    pub open_browser: bool,
}
