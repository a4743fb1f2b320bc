use crate::controller::Completion;

/// Messages from background tasks to the main UI thread
pub enum BackgroundMessage {
    /// An effect finished; fold it back into the controller
    Completed(Completion),
    /// Generic error (task crashes and the like)
    Error(String),
}
