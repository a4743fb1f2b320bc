//! HTTP contract with the analysis backend
//!
//! The backend owns GitHub authentication and runs the AI workflows. This
//! module only knows the request/response shapes; everything behind the
//! endpoints is opaque.

use crate::error::ClientError;
use crate::github::{sanitize_error_body, Identity, RepositoryRef, TreeEntry};
use crate::workflow::{WorkflowKind, WorkflowPayload};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Shown when the backend can't be reached or answers with garbage.
pub const CONNECTIVITY_MESSAGE: &str =
    "Error connecting to backend. Make sure the server is running.";

/// Shown when the backend answered JSON without `result` or `detail`.
pub const GENERIC_ERROR_MESSAGE: &str = "Error occurred";

/// Default per-request timeout for browsing and identity calls
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Workflow calls run multi-agent pipelines and routinely take minutes
pub const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 300;

/// Outcome of a workflow call as the backend reported it.
///
/// Transport failures are folded into `Unreachable` rather than an error so
/// that every call ends with something to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReply {
    Result(String),
    Detail(String),
    Empty,
    Unreachable,
}

impl DispatchReply {
    /// Text for the result panel: result, then detail, then a generic message.
    pub fn into_text(self) -> String {
        match self {
            DispatchReply::Result(text) | DispatchReply::Detail(text) => text,
            DispatchReply::Empty => GENERIC_ERROR_MESSAGE.to_string(),
            DispatchReply::Unreachable => CONNECTIVITY_MESSAGE.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchReply::Result(_))
    }
}

/// Everything the client needs from the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// URL the user should open to authorize the GitHub app.
    async fn login_url(&self) -> Result<String, ClientError>;

    /// Resolve the session token to a profile. Any failure is `SessionInvalid`.
    async fn resolve_identity(&self, user_id: &str) -> Result<Identity, ClientError>;

    async fn list_repositories(&self, user_id: &str) -> Result<Vec<RepositoryRef>, ClientError>;

    async fn list_directory(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<TreeEntry>, ClientError>;

    async fn fetch_file(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, ClientError>;

    async fn dispatch(&self, kind: WorkflowKind, payload: &WorkflowPayload) -> DispatchReply;
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Deserialize)]
struct LoginResponse {
    auth_url: String,
}

#[derive(Deserialize)]
struct UserResponse {
    user: Identity,
}

#[derive(Deserialize)]
struct ReposResponse {
    #[serde(default)]
    repos: Vec<RepositoryRef>,
}

#[derive(Deserialize)]
struct ContentsResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    contents: Vec<TreeEntry>,
}

#[derive(Deserialize)]
struct FileResponse {
    content: String,
}

#[derive(Deserialize)]
struct WorkflowResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl WorkflowResponse {
    fn into_reply(self) -> DispatchReply {
        if let Some(result) = self.result.filter(|r| !r.is_empty()) {
            return DispatchReply::Result(result);
        }
        match self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => DispatchReply::Detail(s),
            Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) | None => {
                DispatchReply::Empty
            }
            // FastAPI validation errors arrive as arrays of objects
            Some(other) => DispatchReply::Detail(other.to_string()),
        }
    }
}

/// Interpret a raw workflow response body.
pub fn parse_dispatch_body(body: &str) -> DispatchReply {
    match serde_json::from_str::<WorkflowResponse>(body) {
        Ok(parsed) => parsed.into_reply(),
        Err(_) => DispatchReply::Unreachable,
    }
}

// ============================================================================
// reqwest implementation
// ============================================================================

pub struct HttpBackend {
    base: Url,
    client: reqwest::Client,
    dispatch_client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base: Url, request_timeout: Duration, dispatch_timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to create HTTP client")?;
        let dispatch_client = reqwest::Client::builder()
            .timeout(dispatch_timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            base,
            client,
            dispatch_client,
        })
    }

    /// Join path segments onto the base URL, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Config(format!("Invalid API base URL: {}", self.base)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn repo_endpoint(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        leaf: &str,
        path: &str,
    ) -> Result<Url, ClientError> {
        let mut url = self.endpoint(&["auth", "github", "repos", user_id, owner, repo, leaf])?;
        url.query_pairs_mut().append_pair("path", path);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        tracing::debug!(%url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ClientError::Fetch(format!("{}: {}", url.path(), e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Fetch(format!(
                "backend returned {}: {}",
                status,
                sanitize_error_body(&body)
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| ClientError::Fetch(format!("unexpected response from {}: {}", url.path(), e)))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn login_url(&self) -> Result<String, ClientError> {
        let url = self.endpoint(&["auth", "github", "login"])?;
        let resp: LoginResponse = self.get_json(url).await?;
        Ok(resp.auth_url)
    }

    async fn resolve_identity(&self, user_id: &str) -> Result<Identity, ClientError> {
        let url = self.endpoint(&["auth", "github", "user", user_id])?;
        match self.get_json::<UserResponse>(url).await {
            Ok(resp) => Ok(resp.user),
            Err(ClientError::Fetch(msg)) => Err(ClientError::SessionInvalid(msg)),
            Err(other) => Err(other),
        }
    }

    async fn list_repositories(&self, user_id: &str) -> Result<Vec<RepositoryRef>, ClientError> {
        let url = self.endpoint(&["auth", "github", "repos", user_id])?;
        let resp: ReposResponse = self.get_json(url).await?;
        Ok(resp.repos)
    }

    async fn list_directory(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<TreeEntry>, ClientError> {
        let url = self.repo_endpoint(user_id, owner, repo, "contents", path)?;
        let resp: ContentsResponse = self.get_json(url).await?;
        if resp.kind != "directory" {
            return Err(ClientError::Fetch(format!(
                "'{}' is not a directory (got {})",
                path, resp.kind
            )));
        }
        Ok(resp.contents)
    }

    async fn fetch_file(
        &self,
        user_id: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, ClientError> {
        let url = self.repo_endpoint(user_id, owner, repo, "file", path)?;
        let resp: FileResponse = self.get_json(url).await?;
        Ok(resp.content)
    }

    async fn dispatch(&self, kind: WorkflowKind, payload: &WorkflowPayload) -> DispatchReply {
        let url = match self.endpoint(kind.endpoint_segments()) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(error = %e, "cannot build workflow endpoint");
                return DispatchReply::Unreachable;
            }
        };

        tracing::info!(workflow = kind.id(), %url, "dispatching workflow");
        let resp = match self.dispatch_client.post(url).json(payload).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(workflow = kind.id(), error = %e, "workflow request failed");
                return DispatchReply::Unreachable;
            }
        };

        let status = resp.status();
        match resp.text().await {
            Ok(body) => {
                let reply = parse_dispatch_body(&body);
                tracing::info!(
                    workflow = kind.id(),
                    status = status.as_u16(),
                    success = reply.is_success(),
                    "workflow finished"
                );
                reply
            }
            Err(e) => {
                tracing::warn!(workflow = kind.id(), error = %e, "failed to read workflow response");
                DispatchReply::Unreachable
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(
            Url::parse(base).unwrap(),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_dispatch_result_wins() {
        let reply = parse_dispatch_body(r#"{"result": "looks good", "detail": "ignored"}"#);
        assert_eq!(reply, DispatchReply::Result("looks good".into()));
    }

    #[test]
    fn test_parse_dispatch_detail() {
        let reply = parse_dispatch_body(r#"{"detail": "rate limited"}"#);
        assert_eq!(reply.into_text(), "rate limited");
    }

    #[test]
    fn test_parse_dispatch_structured_detail() {
        let reply = parse_dispatch_body(r#"{"detail": [{"loc": ["body", "idea"], "msg": "field required"}]}"#);
        let text = reply.into_text();
        assert!(text.contains("field required"));
    }

    #[test]
    fn test_parse_dispatch_empty_object() {
        assert_eq!(parse_dispatch_body("{}").into_text(), GENERIC_ERROR_MESSAGE);
        assert_eq!(
            parse_dispatch_body(r#"{"result": ""}"#).into_text(),
            GENERIC_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_parse_dispatch_garbage_is_connectivity() {
        assert_eq!(
            parse_dispatch_body("<html>502</html>").into_text(),
            CONNECTIVITY_MESSAGE
        );
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let b = backend("http://localhost:8000");
        let url = b.endpoint(&["auth", "github", "user", "42"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/auth/github/user/42");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let b = backend("http://example.com/api/");
        let url = b.endpoint(&["v2", "code-review"]).unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/v2/code-review");
    }

    #[test]
    fn test_repo_endpoint_encodes_path_query() {
        let b = backend("http://localhost:8000");
        let url = b
            .repo_endpoint("42", "alice", "demo", "contents", "src/my dir")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/auth/github/repos/42/alice/demo/contents?path=src%2Fmy+dir"
        );
    }

    #[test]
    fn test_repo_endpoint_root_path_is_empty_query() {
        let b = backend("http://localhost:8000");
        let url = b.repo_endpoint("42", "alice", "demo", "file", "").unwrap();
        assert_eq!(url.query(), Some("path="));
    }
}
