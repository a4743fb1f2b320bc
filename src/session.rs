//! Session persistence
//!
//! The session is a single opaque GitHub user id issued by the backend after
//! the OAuth dance. It survives restarts in a [`TokenStore`] until the user
//! logs out or the backend rejects it.
//!
//! The OAuth redirect lands on an address carrying `github_user_id` and
//! `github_login`. Passing that address at startup (or pasting it into the
//! login prompt) is the callback path: it wins over whatever was persisted,
//! and the one-time parameters are stripped so reusing the address does not
//! log in again.

use std::sync::Mutex;
use url::Url;

pub const CALLBACK_USER_ID_PARAM: &str = "github_user_id";
pub const CALLBACK_LOGIN_PARAM: &str = "github_login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// One-time parameters delivered by the OAuth callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub user_id: String,
    pub login: String,
}

impl CallbackParams {
    /// Read callback parameters from an address. Both must be present and
    /// non-empty.
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut user_id = None;
        let mut login = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                CALLBACK_USER_ID_PARAM => user_id = Some(value.into_owned()),
                CALLBACK_LOGIN_PARAM => login = Some(value.into_owned()),
                _ => {}
            }
        }
        match (user_id, login) {
            (Some(user_id), Some(login)) if !user_id.is_empty() && !login.is_empty() => {
                Some(Self { user_id, login })
            }
            _ => None,
        }
    }
}

/// Remove the callback parameters from `url`, keeping any others.
pub fn strip_callback_params(url: &mut Url) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| {
            let key = k.as_ref();
            key != CALLBACK_USER_ID_PARAM && key != CALLBACK_LOGIN_PARAM
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}

/// Where the session token lives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, String>;
    fn save(&self, token: &str) -> Result<(), String>;
    /// Must succeed when nothing is stored.
    fn remove(&self) -> Result<(), String>;
    /// Human-facing name for diagnostics
    fn label(&self) -> &'static str;
}

/// Process-local store, used when the keychain is disabled and in tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, String> {
        let guard = match self.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<(), String> {
        let mut guard = match self.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), String> {
        let mut guard = match self.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
        Ok(())
    }

    fn label(&self) -> &'static str {
        "memory (not persisted)"
    }
}

/// Restores, persists and clears the session token.
pub struct SessionStore {
    store: Box<dyn TokenStore>,
}

impl SessionStore {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryTokenStore::default()))
    }

    pub fn backend_label(&self) -> &'static str {
        self.store.label()
    }

    /// Restore the session at startup.
    ///
    /// A callback on `address` replaces the persisted token and is stripped
    /// from the address. Otherwise the persisted token, if any, is used.
    pub fn restore(&self, address: Option<&mut Url>) -> Option<Session> {
        if let Some(address) = address {
            if let Some(callback) = self.accept_callback(address) {
                return Some(callback);
            }
        }

        match self.store.load() {
            Ok(Some(token)) if !token.is_empty() => {
                tracing::info!(store = self.store.label(), "restored persisted session");
                Some(Session::new(token))
            }
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(store = self.store.label(), error = %err, "failed to read persisted session");
                None
            }
        }
    }

    /// Consume a callback address. Returns the new session if the address
    /// carried one; the address is stripped either way.
    pub fn accept_callback(&self, address: &mut Url) -> Option<Session> {
        let callback = CallbackParams::from_url(address);
        strip_callback_params(address);
        let callback = callback?;

        tracing::info!(login = %callback.login, "login callback received");
        self.persist(&callback.user_id);
        Some(Session::new(callback.user_id))
    }

    /// Save the token. Failure is logged; the in-memory session still works.
    pub fn persist(&self, token: &str) {
        if let Err(err) = self.store.save(token) {
            tracing::warn!(store = self.store.label(), error = %err, "failed to persist session");
        }
    }

    /// Forget the token. Safe to call repeatedly.
    pub fn clear(&self) {
        if let Err(err) = self.store.remove() {
            tracing::warn!(store = self.store.label(), error = %err, "failed to clear session");
        }
    }

    pub fn persisted_token(&self) -> Option<String> {
        self.store.load().ok().flatten()
    }
}
