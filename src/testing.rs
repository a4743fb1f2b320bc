//! In-process backend for unit tests
//!
//! Serves canned users, repositories, directory listings and files, and
//! records every call so tests can assert on what was fetched.

use crate::backend::{Backend, DispatchReply};
use crate::error::ClientError;
use crate::github::{Identity, RepositoryRef, TreeEntry};
use crate::workflow::{WorkflowKind, WorkflowPayload};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeBackend {
    users: HashMap<String, Identity>,
    repos: Vec<RepositoryRef>,
    /// Keyed by `owner/repo` then path
    dirs: HashMap<(String, String), Vec<TreeEntry>>,
    files: HashMap<(String, String), String>,
    reply: Option<DispatchReply>,
    offline: bool,
    calls: Mutex<Vec<String>>,
    payloads: Mutex<Vec<WorkflowPayload>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: &str, login: &str) -> Self {
        self.users.insert(
            id.to_string(),
            Identity {
                id: id.to_string(),
                login: login.to_string(),
                avatar_url: format!("https://avatars.example/{}", id),
                name: String::new(),
            },
        );
        self
    }

    pub fn with_repos(mut self, repos: Vec<RepositoryRef>) -> Self {
        self.repos = repos;
        self
    }

    pub fn with_dir(mut self, full_name: &str, path: &str, entries: Vec<TreeEntry>) -> Self {
        self.dirs
            .insert((full_name.to_string(), path.to_string()), entries);
        self
    }

    pub fn with_file(mut self, full_name: &str, path: &str, content: &str) -> Self {
        self.files
            .insert((full_name.to_string(), path.to_string()), content.to_string());
        self
    }

    pub fn with_reply(mut self, reply: DispatchReply) -> Self {
        self.reply = Some(reply);
        self
    }

    /// Every call fails as if the server were down.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn payloads(&self) -> Vec<WorkflowPayload> {
        lock(&self.payloads).clone()
    }

    fn record(&self, call: String) -> Result<(), ClientError> {
        lock(&self.calls).push(call);
        if self.offline {
            return Err(ClientError::Fetch("connection refused".to_string()));
        }
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login_url(&self) -> Result<String, ClientError> {
        self.record("login".to_string())?;
        Ok("https://github.com/login/oauth/authorize?client_id=test".to_string())
    }

    async fn resolve_identity(&self, user_id: &str) -> Result<Identity, ClientError> {
        self.record(format!("user {}", user_id))?;
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| ClientError::SessionInvalid("backend returned 404".to_string()))
    }

    async fn list_repositories(&self, user_id: &str) -> Result<Vec<RepositoryRef>, ClientError> {
        self.record(format!("repos {}", user_id))?;
        Ok(self.repos.clone())
    }

    async fn list_directory(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<TreeEntry>, ClientError> {
        let full_name = format!("{}/{}", owner, repo);
        self.record(format!("contents {} {} '{}'", user_id, full_name, path))?;
        self.dirs
            .get(&(full_name, path.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::Fetch(format!("backend returned 404 for '{}'", path)))
    }

    async fn fetch_file(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, ClientError> {
        let full_name = format!("{}/{}", owner, repo);
        self.record(format!("file {} {} '{}'", user_id, full_name, path))?;
        self.files
            .get(&(full_name, path.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::Fetch(format!("backend returned 404 for '{}'", path)))
    }

    async fn dispatch(&self, kind: WorkflowKind, payload: &WorkflowPayload) -> DispatchReply {
        lock(&self.payloads).push(payload.clone());
        if self.record(format!("dispatch {}", kind.id())).is_err() {
            return DispatchReply::Unreachable;
        }
        self.reply
            .clone()
            .unwrap_or_else(|| DispatchReply::Result(format!("{} done", kind.label())))
    }
}
