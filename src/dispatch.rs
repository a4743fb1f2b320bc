//! One-at-a-time workflow calls
//!
//! Workflow calls are slow (minutes, not seconds), so only one may be in
//! flight. Every call gets a sequence number; a reply is applied only if it
//! belongs to the latest call and that call hasn't been abandoned.

use crate::backend::{Backend, DispatchReply};
use crate::error::ClientError;
use crate::workflow::{WorkflowForms, WorkflowKind, WorkflowPayload};

/// What the result panel shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub active: bool,
    pub result_text: String,
    /// Sequence number of the latest call
    pub seq: u64,
    /// Workflow of the latest call
    pub kind: Option<WorkflowKind>,
    /// Whether the last finished call produced a `result`
    pub succeeded: Option<bool>,
}

/// A started call, to be run in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTicket {
    pub seq: u64,
    pub kind: WorkflowKind,
    pub payload: WorkflowPayload,
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    state: RequestState,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn can_submit(&self, kind: WorkflowKind, forms: &WorkflowForms) -> bool {
        !self.state.active && forms.has_required_input(kind)
    }

    /// Start a call. The previous result is blanked.
    pub fn begin(
        &mut self,
        kind: WorkflowKind,
        forms: &WorkflowForms,
    ) -> Result<DispatchTicket, ClientError> {
        if self.state.active {
            return Err(ClientError::Busy);
        }
        if !forms.has_required_input(kind) {
            return Err(ClientError::Dispatch(missing_input_message(kind).to_string()));
        }

        self.state.seq += 1;
        self.state.active = true;
        self.state.kind = Some(kind);
        self.state.succeeded = None;
        self.state.result_text.clear();

        tracing::debug!(workflow = kind.id(), seq = self.state.seq, "dispatch started");
        Ok(DispatchTicket {
            seq: self.state.seq,
            kind,
            payload: forms.build_payload(kind),
        })
    }

    /// Apply a reply. Returns false when the reply was stale and dropped.
    pub fn complete(&mut self, seq: u64, reply: DispatchReply) -> bool {
        if !self.state.active || seq != self.state.seq {
            tracing::debug!(seq, current = self.state.seq, "dropping stale dispatch reply");
            return false;
        }
        self.state.active = false;
        self.state.succeeded = Some(reply.is_success());
        self.state.result_text = reply.into_text();
        true
    }

    /// Forget the in-flight call; its reply will be dropped.
    pub fn abandon(&mut self) {
        if self.state.active {
            tracing::info!(seq = self.state.seq, "dispatch abandoned");
            self.state.seq += 1;
            self.state.active = false;
        }
    }

    /// Blank the result panel without touching an in-flight call.
    pub fn clear_result(&mut self) {
        self.state.result_text.clear();
        self.state.succeeded = None;
    }
}

fn missing_input_message(kind: WorkflowKind) -> &'static str {
    match kind {
        WorkflowKind::ProjectIdea => "Describe your project idea first",
        WorkflowKind::CodeReview => "Paste some code or pick a file from GitHub first",
        WorkflowKind::TestGeneration => "Describe the feature to test first",
        WorkflowKind::BugAnalysis => "Describe the bug first",
    }
}

/// Run a started call against the backend.
pub async fn run(backend: &dyn Backend, ticket: &DispatchTicket) -> DispatchReply {
    backend.dispatch(ticket.kind, &ticket.payload).await
}
