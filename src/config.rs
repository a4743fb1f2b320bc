//! Configuration management for codeassist
//!
//! Stores settings in ~/.config/codeassist/config.json

use crate::backend::{DEFAULT_DISPATCH_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment override for the backend address
pub const API_URL_ENV: &str = "CODEASSIST_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base address
    pub api_url: Option<String>,
    /// Timeout for login, identity and browsing calls
    pub request_timeout_secs: u64,
    /// Timeout for workflow calls, which can run for minutes
    pub dispatch_timeout_secs: u64,
    /// Open the GitHub authorization page in a browser automatically
    pub open_browser: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            dispatch_timeout_secs: DEFAULT_DISPATCH_TIMEOUT_SECS,
            open_browser: true,
        }
    }
}

impl Config {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("codeassist"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                preserve_corrupt_config(path, &content);
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "config file was corrupted; a backup was saved and defaults were loaded"
                );
                Self::default()
            }
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<(), String> {
        let path =
            Self::config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        let dir = path
            .parent()
            .ok_or_else(|| format!("Invalid config path: {}", path.display()))?;

        fs::create_dir_all(dir).map_err(|e| format!("Failed to create config directory: {}", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(dir, fs::Permissions::from_mode(0o700)) {
                tracing::warn!(error = %e, "failed to set config directory permissions");
            }
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        #[cfg(unix)]
        {
            write_config_atomic(path, &content).map_err(|e| format!("Failed to write config: {}", e))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))?;
        }

        Ok(())
    }

    /// Backend address. Precedence: flag, then environment, then file, then
    /// the local default.
    pub fn resolve_api_url(&self, flag: Option<&str>) -> Result<Url, ClientError> {
        let env = std::env::var(API_URL_ENV).ok();
        resolve_api_url_from(flag, env.as_deref(), self.api_url.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs.max(1))
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/codeassist/config.json".to_string())
    }
}

fn resolve_api_url_from(
    flag: Option<&str>,
    env: Option<&str>,
    file: Option<&str>,
) -> Result<Url, ClientError> {
    let raw = [flag, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_API_URL);
    parse_api_url(raw)
}

/// Parse and check a backend address. Only http(s) bases are accepted.
pub fn parse_api_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw)
        .map_err(|e| ClientError::Config(format!("invalid API URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ClientError::Config(format!(
                "API URL must be http or https, got '{}'",
                other
            )))
        }
    }
    if url.cannot_be_a_base() {
        return Err(ClientError::Config(format!("invalid API URL '{}'", raw)));
    }
    Ok(url)
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

#[cfg(unix)]
fn write_config_atomic(path: &Path, content: &str) -> Result<(), String> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::PermissionsExt;

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)
        .map_err(|e| e.to_string())?;

    if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
        tracing::warn!(error = %e, "failed to set temp config file permissions");
    }

    file.write_all(content.as_bytes()).map_err(|e| e.to_string())?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.to_string());
    }
    Ok(())
}
