//! GitHub data as the backend reports it
//!
//! The backend proxies GitHub on our behalf; these are the shapes it returns
//! for users, repositories and directory listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Identity
// ============================================================================

/// Profile of the signed-in GitHub user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// GitHub handle
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    /// Display name; GitHub allows this to be unset
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

impl Identity {
    /// Display name, falling back to the handle.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.login
        } else {
            &self.name
        }
    }
}

// ============================================================================
// Repositories
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    #[serde(default, rename = "private")]
    pub is_private: bool,
    #[serde(default, rename = "language")]
    pub primary_language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_branch() -> String {
    "main".to_string()
}

impl RepositoryRef {
    /// Split `full_name` into `(owner, repo)`.
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        split_full_name(&self.full_name)
    }

    /// Short name for lists; falls back to the repo half of `full_name`.
    pub fn short_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.owner_and_name()
            .map(|(_, repo)| repo)
            .unwrap_or(&self.full_name)
    }
}

/// Split an `owner/repo` string. Both halves must be non-empty and the repo
/// half must not contain another `/`.
pub fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    let (owner, repo) = full_name.trim().split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner, repo))
}

// ============================================================================
// Directory listings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    #[serde(rename = "dir", alias = "directory")]
    Directory,
    /// Symlinks and submodules; shown but not navigable
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
}

impl TreeEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Human readable file size for the picker.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// ============================================================================
// Error bodies
// ============================================================================

/// Maximum length for error body content in error messages
const MAX_ERROR_BODY_LEN: usize = 200;

/// Sanitize an API error body before it reaches a toast or a log line.
/// Truncates long responses and redacts anything that looks like a secret.
pub fn sanitize_error_body(body: &str) -> String {
    const SECRET_PATTERNS: &[&str] = &[
        "token",
        "secret",
        "password",
        "credential",
        "bearer",
        "ghp_",
        "gho_",
        "ghu_",
        "github_pat_",
    ];

    let truncated = if body.chars().count() > MAX_ERROR_BODY_LEN {
        let head: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{}... (truncated)", head)
    } else {
        body.to_string()
    };

    let lower = truncated.to_lowercase();
    for pattern in SECRET_PATTERNS {
        if lower.contains(pattern) {
            return "(error details redacted - may contain sensitive data)".to_string();
        }
    }

    truncated
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_name() {
        assert_eq!(split_full_name("alice/demo"), Some(("alice", "demo")));
        assert_eq!(split_full_name("MyOrg/My-Repo"), Some(("MyOrg", "My-Repo")));
    }

    #[test]
    fn test_split_full_name_rejects_garbage() {
        assert!(split_full_name("demo").is_none());
        assert!(split_full_name("/demo").is_none());
        assert!(split_full_name("alice/").is_none());
        assert!(split_full_name("org/sub/repo").is_none());
        assert!(split_full_name("").is_none());
    }

    #[test]
    fn test_parse_identity_with_numeric_id() {
        let json = r#"{"id": 42, "login": "alice", "avatar_url": "https://a/1.png", "name": null}"#;
        let user: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.login, "alice");
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn test_parse_identity_with_display_name() {
        let json = r#"{"id": "7", "login": "bob", "avatar_url": "", "name": "Bob B"}"#;
        let user: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.display_name(), "Bob B");
    }

    #[test]
    fn test_parse_repository() {
        let json = r#"{
            "id": 1,
            "name": "demo",
            "full_name": "alice/demo",
            "description": null,
            "private": true,
            "html_url": "https://github.com/alice/demo",
            "language": "Rust",
            "updated_at": "2024-05-01T10:00:00Z",
            "default_branch": "trunk"
        }"#;
        let repo: RepositoryRef = serde_json::from_str(json).unwrap();
        assert!(repo.is_private);
        assert_eq!(repo.primary_language.as_deref(), Some("Rust"));
        assert_eq!(repo.default_branch, "trunk");
        assert_eq!(repo.owner_and_name(), Some(("alice", "demo")));
        assert!(repo.updated_at.is_some());
    }

    #[test]
    fn test_parse_repository_minimal() {
        let json = r#"{"id": 2, "full_name": "alice/tools"}"#;
        let repo: RepositoryRef = serde_json::from_str(json).unwrap();
        assert_eq!(repo.short_name(), "tools");
        assert_eq!(repo.default_branch, "main");
        assert!(!repo.is_private);
    }

    #[test]
    fn test_parse_tree_entry_kinds() {
        let dir: TreeEntry =
            serde_json::from_str(r#"{"name":"src","path":"src","type":"dir","size":0}"#).unwrap();
        assert!(dir.is_dir());

        let alias: TreeEntry =
            serde_json::from_str(r#"{"name":"src","path":"src","type":"directory"}"#).unwrap();
        assert!(alias.is_dir());

        let file: TreeEntry =
            serde_json::from_str(r#"{"name":"a.py","path":"a.py","type":"file","size":12}"#)
                .unwrap();
        assert!(file.is_file());
        assert_eq!(file.size, 12);

        let link: TreeEntry =
            serde_json::from_str(r#"{"name":"l","path":"l","type":"symlink"}"#).unwrap();
        assert_eq!(link.kind, EntryKind::Other);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let out = sanitize_error_body(&body);
        assert!(out.ends_with("(truncated)"));
        assert!(out.len() < 250);
    }

    #[test]
    fn test_sanitize_redacts_secrets() {
        let out = sanitize_error_body("bad credentials for ghp_abc");
        assert!(out.contains("redacted"));
    }

    #[test]
    fn test_sanitize_passes_plain_errors() {
        assert_eq!(sanitize_error_body("Not Found"), "Not Found");
    }
}
