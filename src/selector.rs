//! File selection: binding a GitHub file into the shared code buffer
//!
//! The buffer is a sum type so the selected-file pointer and the text it
//! holds can't drift apart: either the buffer is plain text the user typed,
//! or it is a remote file together with the content fetched for it.

use crate::error::ClientError;
use crate::github::RepositoryRef;
use crate::session::Session;
use serde::Serialize;

/// Reference the backend uses to fetch a file itself. Serializes as the
/// `github_auth` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFile {
    pub user_id: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
}

impl RemoteFile {
    pub fn display(&self) -> String {
        format!("{}/{}:{}", self.owner, self.repo, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeBuffer {
    Inline(String),
    Remote { file: RemoteFile, content: String },
}

impl Default for CodeBuffer {
    fn default() -> Self {
        CodeBuffer::Inline(String::new())
    }
}

impl CodeBuffer {
    pub fn text(&self) -> &str {
        match self {
            CodeBuffer::Inline(text) => text,
            CodeBuffer::Remote { content, .. } => content,
        }
    }

    pub fn remote(&self) -> Option<&RemoteFile> {
        match self {
            CodeBuffer::Inline(_) => None,
            CodeBuffer::Remote { file, .. } => Some(file),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.remote().is_some()
    }

    /// Point at a remote file and hold its content, in one step.
    pub fn select_remote(&mut self, file: RemoteFile, content: String) {
        *self = CodeBuffer::Remote { file, content };
    }

    /// Drop the selection and the text together.
    pub fn clear(&mut self) {
        *self = CodeBuffer::default();
    }

    /// User edit. Editing a remote file's content detaches it: the edited
    /// text is now the user's own.
    pub fn edit(&mut self, text: String) {
        match self {
            CodeBuffer::Inline(current) => *current = text,
            CodeBuffer::Remote { content, .. } if *content == text => {}
            CodeBuffer::Remote { .. } => *self = CodeBuffer::Inline(text),
        }
    }

    /// What goes on the wire: the reference if a file is selected, else the
    /// inline text when there is any.
    pub fn attachment(&self) -> Option<crate::workflow::CodeAttachment> {
        use crate::workflow::CodeAttachment;

        match self {
            CodeBuffer::Remote { file, .. } => Some(CodeAttachment::Remote(file.clone())),
            CodeBuffer::Inline(text) if text.is_empty() => None,
            CodeBuffer::Inline(text) => Some(CodeAttachment::Inline(text.clone())),
        }
    }
}

/// A file read the selector is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    pub file: RemoteFile,
}

/// Tracks at most one outstanding file read.
#[derive(Debug, Clone, Default)]
pub struct FileSelector {
    pending: Option<FileRequest>,
}

impl FileSelector {
    /// Start reading `path` from the active repository.
    pub fn select(
        &mut self,
        session: Option<&Session>,
        repo: Option<&RepositoryRef>,
        path: &str,
    ) -> Result<FileRequest, ClientError> {
        let session = session.ok_or(ClientError::NoSession)?;
        let repo = repo.ok_or(ClientError::NoRepository)?;
        if self.pending.is_some() {
            return Err(ClientError::Busy);
        }
        let (owner, name) = repo.owner_and_name().ok_or_else(|| {
            ClientError::Fetch(format!("malformed repository name '{}'", repo.full_name))
        })?;

        let request = FileRequest {
            file: RemoteFile {
                user_id: session.user_id.clone(),
                owner: owner.to_string(),
                repo: name.to_string(),
                path: path.to_string(),
            },
        };
        self.pending = Some(request.clone());
        Ok(request)
    }

    /// Apply the read. On success the buffer is replaced and `true` is
    /// returned, meaning the picker should close. A failed or stale read
    /// leaves the buffer alone.
    pub fn complete(
        &mut self,
        request: &FileRequest,
        result: Result<String, ClientError>,
        buffer: &mut CodeBuffer,
    ) -> Result<bool, ClientError> {
        if self.pending.as_ref() != Some(request) {
            tracing::debug!(path = %request.file.path, "ignoring stale file read");
            return Ok(false);
        }
        self.pending = None;
        let content = result?;
        buffer.select_remote(request.file.clone(), content);
        Ok(true)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }
}
