//! System keychain storage for the session token
//!
//! All credentials live in a single keychain entry stored as JSON, so the OS
//! prompts at most once. Reads are cached for the life of the process.

use crate::session::TokenStore;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

/// Fixed storage key for the session token.
const KEYRING_SERVICE: &str = "codeassist";
const KEYRING_USERNAME: &str = "github_user_id";

/// Everything stored in the single keychain entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    github_user_id: Option<String>,
}

type KeyringResult<T> = Result<T, String>;

static CREDENTIALS_CACHE: OnceLock<Mutex<Option<StoredCredentials>>> = OnceLock::new();
static KEYRING_ERROR_WARNED: AtomicBool = AtomicBool::new(false);

fn credentials_cache() -> &'static Mutex<Option<StoredCredentials>> {
    CREDENTIALS_CACHE.get_or_init(|| Mutex::new(None))
}

/// Whether the keychain has been switched off for this process.
pub fn keyring_disabled() -> bool {
    if cfg!(test) {
        return true;
    }
    matches!(
        std::env::var("CODEASSIST_DISABLE_KEYRING")
            .unwrap_or_default()
            .to_lowercase()
            .as_str(),
        "1" | "true" | "yes"
    )
}

fn keyring_entry() -> Result<Entry, keyring::Error> {
    Entry::new(KEYRING_SERVICE, KEYRING_USERNAME)
}

/// Warn about keychain errors only once per session
fn warn_keychain_error_once(context: &str, err: &str) {
    if KEYRING_ERROR_WARNED.swap(true, Ordering::Relaxed) {
        return;
    }
    tracing::warn!(
        context,
        error = err,
        "couldn't access system keychain; set CODEASSIST_DISABLE_KEYRING=1 to skip it"
    );
}

fn read_credentials_uncached() -> KeyringResult<StoredCredentials> {
    let entry = keyring_entry().map_err(|e| e.to_string())?;
    match entry.get_password() {
        Ok(json) => {
            serde_json::from_str(&json).map_err(|e| format!("Failed to parse credentials: {}", e))
        }
        Err(keyring::Error::NoEntry) => Ok(StoredCredentials::default()),
        Err(err) => Err(err.to_string()),
    }
}

fn write_credentials(creds: &StoredCredentials) -> KeyringResult<()> {
    let entry = keyring_entry().map_err(|e| e.to_string())?;
    let json = serde_json::to_string(creds).map_err(|e| e.to_string())?;
    entry.set_password(&json).map_err(|e| e.to_string())
}

fn read_credentials_cached() -> KeyringResult<StoredCredentials> {
    let mut guard = match credentials_cache().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(ref creds) = *guard {
        return Ok(creds.clone());
    }
    let creds = read_credentials_uncached()?;
    *guard = Some(creds.clone());
    Ok(creds)
}

fn update_cache(creds: StoredCredentials) {
    let mut guard = match credentials_cache().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Some(creds);
}

/// Session token storage backed by the OS keychain.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeychainTokenStore;

impl TokenStore for KeychainTokenStore {
    fn load(&self) -> Result<Option<String>, String> {
        match read_credentials_cached() {
            Ok(creds) => Ok(creds.github_user_id),
            Err(err) => {
                warn_keychain_error_once("session token", &err);
                Err(err)
            }
        }
    }

    fn save(&self, token: &str) -> Result<(), String> {
        let mut creds = read_credentials_cached().unwrap_or_default();
        creds.github_user_id = Some(token.to_string());
        write_credentials(&creds)?;
        update_cache(creds);
        Ok(())
    }

    fn remove(&self) -> Result<(), String> {
        let mut creds = read_credentials_cached().unwrap_or_default();
        if creds.github_user_id.is_none() {
            return Ok(());
        }
        creds.github_user_id = None;
        write_credentials(&creds)?;
        update_cache(creds);
        Ok(())
    }

    fn label(&self) -> &'static str {
        if cfg!(target_os = "macos") {
            "macOS Keychain"
        } else if cfg!(target_os = "windows") {
            "Windows Credential Manager"
        } else {
            "system keyring"
        }
    }
}
