//! Identity resolution
//!
//! Turns the session token into a GitHub profile. Any failure, including the
//! backend being unreachable, comes back as `SessionInvalid`. Clearing the
//! persisted token is left to the caller, which knows whether the answer is
//! still about the current session.

use crate::backend::Backend;
use crate::error::ClientError;
use crate::github::Identity;
use crate::session::Session;

/// Resolve `session` to an identity.
pub async fn resolve(backend: &dyn Backend, session: &Session) -> Result<Identity, ClientError> {
    match backend.resolve_identity(&session.user_id).await {
        Ok(identity) => {
            tracing::info!(login = %identity.login, "identity resolved");
            Ok(identity)
        }
        Err(err) => {
            tracing::warn!(error = %err, "identity resolution failed");
            Err(into_session_invalid(err))
        }
    }
}

/// Unreachable and rejected look the same to the caller.
pub fn into_session_invalid(err: ClientError) -> ClientError {
    match err {
        ClientError::SessionInvalid(msg) => ClientError::SessionInvalid(msg),
        other => ClientError::SessionInvalid(other.to_string()),
    }
}
