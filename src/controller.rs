//! Client state container
//!
//! The [`Controller`] is the only thing that mutates client state. Front ends
//! call its transition methods, run the [`Effect`]s those return (usually in
//! the background), and feed the answers back through [`Controller::apply`].
//! After every change an immutable [`Snapshot`] is published on a
//! `tokio::sync::watch` channel for renderers to read.

use crate::backend::{Backend, DispatchReply};
use crate::browser::{
    self, BrowserPhase, BrowserRequest, BrowserResponse, Navigation, NavigationState,
    RepositoryBrowser,
};
use crate::dispatch::{self, DispatchTicket, Dispatcher, RequestState};
use crate::error::ClientError;
use crate::github::{Identity, RepositoryRef};
use crate::identity;
use crate::selector::{FileRequest, FileSelector, RemoteFile};
use crate::session::{Session, SessionStore};
use crate::workflow::{FormField, WorkflowForms, WorkflowKind};
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

/// Network work a transition asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchLoginUrl,
    ResolveIdentity(Session),
    Browse {
        session: Session,
        request: BrowserRequest,
    },
    ReadFile(FileRequest),
    Dispatch(DispatchTicket),
}

impl Effect {
    /// Short name for logs and task labels
    pub fn name(&self) -> &'static str {
        match self {
            Effect::FetchLoginUrl => "login_url",
            Effect::ResolveIdentity(_) => "identity",
            Effect::Browse { .. } => "browse",
            Effect::ReadFile(_) => "read_file",
            Effect::Dispatch(_) => "dispatch",
        }
    }
}

/// The answer to an [`Effect`].
#[derive(Debug, Clone)]
pub enum Completion {
    LoginUrl(Result<String, ClientError>),
    Identity {
        session: Session,
        result: Result<Identity, ClientError>,
    },
    Browse {
        request: BrowserRequest,
        response: BrowserResponse,
    },
    File {
        request: FileRequest,
        result: Result<String, ClientError>,
    },
    Dispatch {
        seq: u64,
        reply: DispatchReply,
    },
}

/// Read-only view of everything a renderer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub user_id: Option<String>,
    pub identity: Option<Identity>,
    pub resolving_identity: bool,
    pub login_url: Option<String>,
    pub tab: WorkflowKind,
    pub forms: WorkflowForms,
    pub request: RequestState,
    pub can_submit: bool,
    pub picker_open: bool,
    pub browser_phase: Option<BrowserPhase>,
    pub repositories: Vec<RepositoryRef>,
    pub navigation: NavigationState,
    pub file_loading: bool,
}

impl Snapshot {
    pub fn signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn selected_file(&self) -> Option<&RemoteFile> {
        self.forms.code.remote()
    }

    /// Whether anything in the picker is waiting on the network.
    pub fn picker_loading(&self) -> bool {
        self.file_loading || self.browser_phase.is_some_and(|p| p.is_loading())
    }
}

pub struct Controller {
    store: Arc<SessionStore>,
    session: Option<Session>,
    identity: Option<Identity>,
    resolving_identity: bool,
    login_url: Option<String>,
    browser: RepositoryBrowser,
    selector: FileSelector,
    forms: WorkflowForms,
    tab: WorkflowKind,
    dispatcher: Dispatcher,
    picker_open: bool,
    tx: watch::Sender<Snapshot>,
}

impl Controller {
    pub fn new(store: Arc<SessionStore>) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        let controller = Self {
            store,
            session: None,
            identity: None,
            resolving_identity: false,
            login_url: None,
            browser: RepositoryBrowser::new(),
            selector: FileSelector::default(),
            forms: WorkflowForms::default(),
            tab: WorkflowKind::default(),
            dispatcher: Dispatcher::new(),
            picker_open: false,
            tx,
        };
        controller.publish();
        controller
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            user_id: self.session.as_ref().map(|s| s.user_id.clone()),
            identity: self.identity.clone(),
            resolving_identity: self.resolving_identity,
            login_url: self.login_url.clone(),
            tab: self.tab,
            forms: self.forms.clone(),
            request: self.dispatcher.state().clone(),
            can_submit: self.dispatcher.can_submit(self.tab, &self.forms),
            picker_open: self.picker_open,
            browser_phase: self.session.as_ref().map(|_| self.browser.phase()),
            repositories: self.browser.repositories().to_vec(),
            navigation: self.browser.navigation().clone(),
            file_loading: self.selector.is_loading(),
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Restore a session at startup, preferring a callback on `launch`.
    pub fn start(&mut self, launch: Option<&mut Url>) -> Option<Effect> {
        let session = self.store.restore(launch)?;
        let effect = self.sign_in(session);
        self.publish();
        Some(effect)
    }

    /// Log in from a pasted or forwarded callback address.
    pub fn accept_callback(&mut self, address: &mut Url) -> Result<Effect, ClientError> {
        let Some(session) = self.store.accept_callback(address) else {
            return Err(ClientError::SessionInvalid(
                "that address has no github_user_id and github_login".to_string(),
            ));
        };
        if self.session.is_some() {
            self.reset_session_state();
        }
        let effect = self.sign_in(session);
        self.login_url = None;
        self.publish();
        Ok(effect)
    }

    fn sign_in(&mut self, session: Session) -> Effect {
        self.session = Some(session.clone());
        self.identity = None;
        self.resolving_identity = true;
        self.browser.sign_in();
        Effect::ResolveIdentity(session)
    }

    pub fn request_login(&mut self) -> Effect {
        self.login_url = None;
        self.publish();
        Effect::FetchLoginUrl
    }

    /// Forget the session everywhere, including the persisted token.
    pub fn logout(&mut self) {
        self.store.clear();
        self.reset_session_state();
        self.publish();
        tracing::info!("logged out");
    }

    fn reset_session_state(&mut self) {
        self.session = None;
        self.identity = None;
        self.resolving_identity = false;
        self.browser.sign_out();
        self.selector.reset();
        if self.forms.code.is_remote() {
            self.forms.code.clear();
        }
        self.dispatcher.abandon();
        self.picker_open = false;
    }

    // ------------------------------------------------------------------
    // Picker
    // ------------------------------------------------------------------

    fn require_session(&self) -> Result<Session, ClientError> {
        self.session.clone().ok_or(ClientError::NoSession)
    }

    fn browse(&self, request: BrowserRequest) -> Result<Effect, ClientError> {
        Ok(Effect::Browse {
            session: self.require_session()?,
            request,
        })
    }

    pub fn open_picker(&mut self) -> Result<Option<Effect>, ClientError> {
        self.require_session()?;
        if !self.tab.accepts_code() {
            return Err(ClientError::NoCodeInput(self.tab.label().to_string()));
        }
        let request = self.browser.open_picker()?;
        self.picker_open = true;
        self.publish();
        request.map(|r| self.browse(r)).transpose()
    }

    pub fn close_picker(&mut self) {
        self.picker_open = false;
        self.publish();
    }

    pub fn refresh_repositories(&mut self) -> Result<Effect, ClientError> {
        let request = self.browser.refresh_repositories()?;
        self.publish();
        self.browse(request)
    }

    pub fn select_repository(&mut self, index: usize) -> Result<Effect, ClientError> {
        let repo = self
            .browser
            .repositories()
            .get(index)
            .cloned()
            .ok_or(ClientError::NoRepository)?;
        let request = self.browser.select_repository(repo)?;
        if self.forms.code.is_remote() {
            self.forms.code.clear();
        }
        self.publish();
        self.browse(request)
    }

    /// Step into the entry at `index`: a directory is listed, a file is read.
    pub fn open_entry(&mut self, index: usize) -> Result<Option<Effect>, ClientError> {
        if self.selector.is_loading() {
            return Err(ClientError::Busy);
        }
        let Some(entry) = self.browser.navigation().current_entries().get(index).cloned() else {
            return Ok(None);
        };
        let effect = match self.browser.navigate_into(&entry)? {
            Navigation::Fetch(request) => Some(self.browse(request)?),
            Navigation::OpenFile(path) => {
                let request = self.selector.select(
                    self.session.as_ref(),
                    self.browser.navigation().selected_repo(),
                    &path,
                )?;
                Some(Effect::ReadFile(request))
            }
            Navigation::ReturnedToRepoList | Navigation::Stay => None,
        };
        self.publish();
        Ok(effect)
    }

    pub fn navigate_up(&mut self) -> Result<Option<Effect>, ClientError> {
        let effect = match self.browser.navigate_up()? {
            Navigation::Fetch(request) => Some(self.browse(request)?),
            _ => None,
        };
        self.publish();
        Ok(effect)
    }

    /// Drop the selected file and its content.
    pub fn clear_selection(&mut self) {
        self.forms.code.clear();
        self.publish();
    }

    // ------------------------------------------------------------------
    // Workflows
    // ------------------------------------------------------------------

    pub fn set_tab(&mut self, kind: WorkflowKind) {
        if self.tab != kind {
            self.tab = kind;
            self.dispatcher.clear_result();
            if !kind.accepts_code() {
                self.picker_open = false;
            }
            self.publish();
        }
    }

    pub fn edit_field(&mut self, field: FormField, value: String) {
        self.forms.set_value(field, value);
        self.publish();
    }

    pub fn cycle_choice(&mut self, field: FormField, forward: bool) {
        self.forms.cycle_choice(field, forward);
        self.publish();
    }

    pub fn submit(&mut self) -> Result<Effect, ClientError> {
        let ticket = self.dispatcher.begin(self.tab, &self.forms)?;
        self.publish();
        Ok(Effect::Dispatch(ticket))
    }

    pub fn cancel_dispatch(&mut self) {
        self.dispatcher.abandon();
        self.publish();
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Fold a finished effect back into state. Errors are for display only;
    /// state is already consistent when one is returned.
    pub fn apply(&mut self, completion: Completion) -> Result<(), ClientError> {
        let outcome = self.apply_inner(completion);
        self.publish();
        outcome
    }

    fn apply_inner(&mut self, completion: Completion) -> Result<(), ClientError> {
        match completion {
            Completion::LoginUrl(result) => {
                self.login_url = Some(result?);
                Ok(())
            }
            Completion::Identity { session, result } => {
                if self.session.as_ref() != Some(&session) {
                    return Ok(());
                }
                self.resolving_identity = false;
                match result {
                    Ok(identity) => {
                        self.identity = Some(identity);
                        Ok(())
                    }
                    Err(err) => {
                        if err.is_session_invalid() {
                            self.store.clear();
                        }
                        self.reset_session_state();
                        Err(err)
                    }
                }
            }
            Completion::Browse { request, response } => {
                if self.session.is_none() {
                    return Ok(());
                }
                self.browser.complete(&request, response)
            }
            Completion::File { request, result } => {
                let closed = self.selector.complete(&request, result, &mut self.forms.code)?;
                if closed {
                    self.picker_open = false;
                }
                Ok(())
            }
            Completion::Dispatch { seq, reply } => {
                self.dispatcher.complete(seq, reply);
                Ok(())
            }
        }
    }
}

/// Run an effect to completion.
pub async fn run_effect(backend: &dyn Backend, effect: Effect) -> Completion {
    match effect {
        Effect::FetchLoginUrl => Completion::LoginUrl(backend.login_url().await),
        Effect::ResolveIdentity(session) => {
            let result = identity::resolve(backend, &session).await;
            Completion::Identity { session, result }
        }
        Effect::Browse { session, request } => {
            let response = browser::fetch(backend, &session, &request).await;
            Completion::Browse { request, response }
        }
        Effect::ReadFile(request) => {
            let file = &request.file;
            let result = backend
                .fetch_file(&file.user_id, &file.owner, &file.repo, &file.path)
                .await;
            Completion::File { request, result }
        }
        Effect::Dispatch(ticket) => {
            let reply = dispatch::run(backend, &ticket).await;
            Completion::Dispatch {
                seq: ticket.seq,
                reply,
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
