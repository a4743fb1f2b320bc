//! Repository browser state machine
//!
//! A single linear path stack over a remote tree: repositories, then
//! directories, then files. Every transition fetches the listing it needs
//! fresh; nothing is cached except the repository list itself.
//!
//! Transitions don't perform I/O. They return a [`BrowserRequest`] for the
//! caller to run, and the answer comes back through `complete_*`. The
//! navigation state is only replaced when a fetch succeeds, so the entries on
//! screen always belong to the path on screen.

use crate::backend::Backend;
use crate::error::ClientError;
use crate::github::{RepositoryRef, TreeEntry};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserPhase {
    NoSession,
    RepoListLoading,
    RepoListReady,
    DirLoading,
    DirReady,
}

impl BrowserPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, BrowserPhase::RepoListLoading | BrowserPhase::DirLoading)
    }
}

/// Where the user is inside a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    selected_repo: Option<RepositoryRef>,
    path_segments: Vec<String>,
    current_entries: Vec<TreeEntry>,
}

impl NavigationState {
    pub fn selected_repo(&self) -> Option<&RepositoryRef> {
        self.selected_repo.as_ref()
    }

    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    pub fn current_entries(&self) -> &[TreeEntry] {
        &self.current_entries
    }

    /// Segments joined with `/`; empty at the repository root.
    pub fn path(&self) -> String {
        self.path_segments.join("/")
    }
}

/// A fetch the browser is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserRequest {
    ListRepositories,
    ListDirectory {
        repo: RepositoryRef,
        segments: Vec<String>,
    },
}

impl BrowserRequest {
    pub fn path(&self) -> String {
        match self {
            BrowserRequest::ListRepositories => String::new(),
            BrowserRequest::ListDirectory { segments, .. } => segments.join("/"),
        }
    }
}

/// Answer to a [`BrowserRequest`].
#[derive(Debug, Clone)]
pub enum BrowserResponse {
    Repositories(Result<Vec<RepositoryRef>, ClientError>),
    Directory(Result<Vec<TreeEntry>, ClientError>),
}

/// What a navigation step asks of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Run this fetch and report back.
    Fetch(BrowserRequest),
    /// A file was picked; hand the path to the file selector.
    OpenFile(String),
    /// Went back past the repository root.
    ReturnedToRepoList,
    /// Nothing to do (e.g. a symlink entry).
    Stay,
}

#[derive(Debug, Clone, Default)]
pub struct RepositoryBrowser {
    signed_in: bool,
    /// `None` until a listing succeeds
    repos: Option<Vec<RepositoryRef>>,
    nav: NavigationState,
    pending: Option<BrowserRequest>,
}

impl RepositoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BrowserPhase {
        if !self.signed_in {
            return BrowserPhase::NoSession;
        }
        match &self.pending {
            Some(BrowserRequest::ListRepositories) => BrowserPhase::RepoListLoading,
            Some(BrowserRequest::ListDirectory { .. }) => BrowserPhase::DirLoading,
            None if self.nav.selected_repo.is_some() => BrowserPhase::DirReady,
            None => BrowserPhase::RepoListReady,
        }
    }

    pub fn repositories(&self) -> &[RepositoryRef] {
        self.repos.as_deref().unwrap_or(&[])
    }

    pub fn has_repository_list(&self) -> bool {
        self.repos.is_some()
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn pending(&self) -> Option<&BrowserRequest> {
        self.pending.as_ref()
    }

    /// A session became active.
    pub fn sign_in(&mut self) {
        self.signed_in = true;
    }

    /// Drop everything tied to the session.
    pub fn sign_out(&mut self) {
        *self = Self::default();
    }

    fn ensure_ready(&self) -> Result<(), ClientError> {
        if !self.signed_in {
            return Err(ClientError::NoSession);
        }
        if self.pending.is_some() {
            return Err(ClientError::Busy);
        }
        Ok(())
    }

    fn start(&mut self, request: BrowserRequest) -> BrowserRequest {
        self.pending = Some(request.clone());
        request
    }

    /// Open the picker. Fetches the repository list unless one is cached.
    pub fn open_picker(&mut self) -> Result<Option<BrowserRequest>, ClientError> {
        self.ensure_ready()?;
        if self.repos.is_some() {
            return Ok(None);
        }
        Ok(Some(self.start(BrowserRequest::ListRepositories)))
    }

    /// Fetch the repository list even if one is cached.
    pub fn refresh_repositories(&mut self) -> Result<BrowserRequest, ClientError> {
        self.ensure_ready()?;
        Ok(self.start(BrowserRequest::ListRepositories))
    }

    /// Enter a repository at its root.
    pub fn select_repository(&mut self, repo: RepositoryRef) -> Result<BrowserRequest, ClientError> {
        self.ensure_ready()?;
        Ok(self.start(BrowserRequest::ListDirectory {
            repo,
            segments: Vec::new(),
        }))
    }

    /// Step into a directory, or route a file to the selector.
    pub fn navigate_into(&mut self, entry: &TreeEntry) -> Result<Navigation, ClientError> {
        self.ensure_ready()?;
        let repo = self
            .nav
            .selected_repo
            .clone()
            .ok_or(ClientError::NoRepository)?;

        if entry.is_file() {
            return Ok(Navigation::OpenFile(entry.path.clone()));
        }
        if !entry.is_dir() {
            return Ok(Navigation::Stay);
        }

        let mut segments = self.nav.path_segments.clone();
        segments.push(entry.name.clone());
        Ok(Navigation::Fetch(
            self.start(BrowserRequest::ListDirectory { repo, segments }),
        ))
    }

    /// Pop one segment, or leave the repository when already at its root.
    ///
    /// Leaving the repository never fails; an outstanding directory fetch is
    /// abandoned and its answer will be ignored.
    pub fn navigate_up(&mut self) -> Result<Navigation, ClientError> {
        if !self.signed_in {
            return Err(ClientError::NoSession);
        }

        let at_root = self.nav.selected_repo.is_none() || self.nav.path_segments.is_empty();
        if at_root {
            if matches!(self.pending, Some(BrowserRequest::ListDirectory { .. })) {
                self.pending = None;
            }
            self.nav = NavigationState::default();
            return Ok(Navigation::ReturnedToRepoList);
        }

        if self.pending.is_some() {
            return Err(ClientError::Busy);
        }
        let Some(repo) = self.nav.selected_repo.clone() else {
            return Ok(Navigation::ReturnedToRepoList);
        };
        let mut segments = self.nav.path_segments.clone();
        segments.pop();
        Ok(Navigation::Fetch(
            self.start(BrowserRequest::ListDirectory { repo, segments }),
        ))
    }

    /// Apply the answer to `request`. Answers to anything but the outstanding
    /// request are ignored. Failures leave the browser as it was.
    pub fn complete(
        &mut self,
        request: &BrowserRequest,
        response: BrowserResponse,
    ) -> Result<(), ClientError> {
        if self.pending.as_ref() != Some(request) {
            tracing::debug!(path = %request.path(), "ignoring stale browser response");
            return Ok(());
        }
        self.pending = None;

        match (request, response) {
            (BrowserRequest::ListRepositories, BrowserResponse::Repositories(result)) => {
                let repos = result?;
                tracing::debug!(count = repos.len(), "repository list replaced");
                self.repos = Some(repos);
                Ok(())
            }
            (
                BrowserRequest::ListDirectory { repo, segments },
                BrowserResponse::Directory(result),
            ) => {
                let entries = result?;
                self.nav = NavigationState {
                    selected_repo: Some(repo.clone()),
                    path_segments: segments.clone(),
                    current_entries: entries,
                };
                Ok(())
            }
            _ => Err(ClientError::Fetch(
                "response does not match the request".to_string(),
            )),
        }
    }
}

/// Run a browser request against the backend.
pub async fn fetch(
    backend: &dyn Backend,
    session: &Session,
    request: &BrowserRequest,
) -> BrowserResponse {
    match request {
        BrowserRequest::ListRepositories => {
            BrowserResponse::Repositories(backend.list_repositories(&session.user_id).await)
        }
        BrowserRequest::ListDirectory { repo, segments } => {
            let Some((owner, name)) = repo.owner_and_name() else {
                return BrowserResponse::Directory(Err(ClientError::Fetch(format!(
                    "malformed repository name '{}'",
                    repo.full_name
                ))));
            };
            let path = segments.join("/");
            BrowserResponse::Directory(
                backend
                    .list_directory(&session.user_id, owner, name, &path)
                    .await,
            )
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
