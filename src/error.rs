//! Error taxonomy for the client core
//!
//! Every failure is caught at the boundary of the operation that produced it
//! and turned into either a session reset (`SessionInvalid`) or a message the
//! user can read (`Fetch`, `Dispatch`). Nothing here is fatal to the UI.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Token rejected by the auth collaborator, or the collaborator was
    /// unreachable. Forces logout.
    #[error("Session is no longer valid: {0}")]
    SessionInvalid(String),

    /// Repository listing or file read failed. State is unchanged.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Workflow call failed. Surfaced as result text.
    #[error("{0}")]
    Dispatch(String),

    /// A previous transition is still waiting for its fetch.
    #[error("Still loading, try again in a moment")]
    Busy,

    #[error("Not signed in to GitHub")]
    NoSession,

    #[error("No repository selected")]
    NoRepository,

    /// The active workflow has no code input to attach a file to.
    #[error("{0} doesn't take code")]
    NoCodeInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Message suitable for a toast. Error-ish wording keeps it visible.
    pub fn user_message(&self) -> String {
        match self {
            Self::Busy => "Request failed: still loading, try again in a moment".into(),
            other => other.to_string(),
        }
    }

    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid(_))
    }
}
