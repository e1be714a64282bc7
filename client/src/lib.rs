//! REST client for the remote task API.
//!
//! # Architecture
//!
//! One [`ApiClient`] wraps a pooled [`reqwest::Client`] and the API base URL.
//! Each operation maps to a single HTTP call:
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | [`ApiClient::login`] | POST | `/auth/login` |
//! | [`ApiClient::list_tasks`] | GET | `/tasks` |
//! | [`ApiClient::create_task`] | POST | `/tasks` |
//! | [`ApiClient::update_task`] | PUT | `/tasks/:id` |
//! | [`ApiClient::delete_task`] | DELETE | `/tasks/:id` |
//!
//! Authenticated operations read the bearer token through a [`TokenSource`]
//! on every call; the client never holds a token in memory. Requests carry no
//! timeout and are never retried - a call that never resolves stays pending,
//! and every failure is terminal for that single operation.
//!
//! # Error Handling
//!
//! Failures surface as [`ApiError`]. HTTP 401 is the one status callers branch
//! on ([`ApiError::Unauthorized`] invalidates the session); everything else
//! collapses into transport, status, or decode errors that callers report
//! generically.

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use tarea_types::{
    Credentials, LoginResponse, NewTask, SessionToken, Task, TaskId, TaskPatch, TaskTitle,
};

/// Default API root, matching the development server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/api";

const TCP_KEEPALIVE_SECS: u64 = 60;

const POOL_MAX_IDLE_PER_HOST: usize = 100;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Source of the current session token, consulted on every request.
///
/// Implementations are expected to re-read persistent storage each time so a
/// token cleared elsewhere in the process is never sent again.
pub trait TokenSource: Send + Sync {
    fn current(&self) -> Option<SessionToken>;
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP 401: the server rejected the session.
    #[error("authentication rejected by the server")]
    Unauthorized,
    /// An authenticated call was attempted with no stored token.
    #[error("no session token available")]
    NoSession,
    /// Non-2xx status other than 401. The body is capped for logging.
    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// Connection-level failure before a status was received.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// 2xx response whose body was not the expected JSON shape.
    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// True when the failure means the stored session is no longer usable.
    #[must_use]
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::NoSession)
    }
}

/// Client for the remote task collection.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client against the given API root (e.g. `http://localhost:4000/api`).
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
            .build()?;
        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchange credentials for a session token.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionToken, ApiError> {
        let url = self.endpoint(&["auth", "login"]);
        tracing::debug!(%url, email = %credentials.email, "login request");
        let response = self.http.post(url).json(credentials).send().await?;
        let response = check_status(response).await?;
        let login: LoginResponse = response.json().await.map_err(ApiError::Decode)?;
        Ok(login.token)
    }

    /// Fetch the full task collection for the authenticated user.
    pub async fn list_tasks(&self, tokens: &dyn TokenSource) -> Result<Vec<Task>, ApiError> {
        let url = self.endpoint(&["tasks"]);
        tracing::debug!(%url, "list request");
        let response = self
            .http
            .get(url)
            .bearer_auth(bearer(tokens)?)
            .send()
            .await?;
        let response = check_status(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Create a task; the server assigns the id and returns the full record.
    pub async fn create_task(
        &self,
        tokens: &dyn TokenSource,
        title: TaskTitle,
    ) -> Result<Task, ApiError> {
        let url = self.endpoint(&["tasks"]);
        tracing::debug!(%url, title = title.as_str(), "create request");
        let response = self
            .http
            .post(url)
            .bearer_auth(bearer(tokens)?)
            .json(&NewTask::new(title))
            .send()
            .await?;
        let response = check_status(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Update a task's completion flag; returns the server's representation.
    pub async fn update_task(
        &self,
        tokens: &dyn TokenSource,
        id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task, ApiError> {
        let url = self.endpoint(&["tasks", &id.to_string()]);
        tracing::debug!(%url, completed = patch.completed, "update request");
        let response = self
            .http
            .put(url)
            .bearer_auth(bearer(tokens)?)
            .json(&patch)
            .send()
            .await?;
        let response = check_status(response).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Delete a task. Only the status matters; the body is ignored.
    pub async fn delete_task(&self, tokens: &dyn TokenSource, id: TaskId) -> Result<(), ApiError> {
        let url = self.endpoint(&["tasks", &id.to_string()]);
        tracing::debug!(%url, "delete request");
        let response = self
            .http
            .delete(url)
            .bearer_auth(bearer(tokens)?)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .expect("API base URL cannot be a base");
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }
}

fn bearer(tokens: &dyn TokenSource) -> Result<String, ApiError> {
    match tokens.current() {
        Some(token) if !token.is_empty() => Ok(token.expose_secret().to_string()),
        _ => Err(ApiError::NoSession),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        tracing::warn!("server rejected session (401)");
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let body = read_capped_error_body(response).await;
        tracing::warn!(%status, %body, "request failed");
        return Err(ApiError::Status { status, body });
    }
    Ok(response)
}

async fn read_capped_error_body(response: reqwest::Response) -> String {
    let Ok(body) = response.bytes().await else {
        return String::from("(unreadable body)");
    };
    if body.len() > MAX_ERROR_BODY_BYTES {
        let text = String::from_utf8_lossy(&body[..MAX_ERROR_BODY_BYTES]);
        return format!("{text}...(truncated)");
    }
    String::from_utf8_lossy(&body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::{ApiClient, ApiError, TokenSource, bearer};
    use tarea_types::{SessionToken, TaskId};
    use url::Url;

    struct StaticTokens(Option<SessionToken>);

    impl TokenSource for StaticTokens {
        fn current(&self) -> Option<SessionToken> {
            self.0.clone()
        }
    }

    fn client() -> ApiClient {
        ApiClient::new(Url::parse("http://localhost:4000/api").unwrap()).unwrap()
    }

    #[test]
    fn endpoint_preserves_base_path() {
        let client = client();
        assert_eq!(
            client.endpoint(&["tasks"]).as_str(),
            "http://localhost:4000/api/tasks"
        );
        assert_eq!(
            client
                .endpoint(&["tasks", &TaskId::new(12).to_string()])
                .as_str(),
            "http://localhost:4000/api/tasks/12"
        );
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        let client = ApiClient::new(Url::parse("http://localhost:4000/api/").unwrap()).unwrap();
        assert_eq!(
            client.endpoint(&["auth", "login"]).as_str(),
            "http://localhost:4000/api/auth/login"
        );
    }

    #[test]
    fn bearer_requires_a_token() {
        assert!(matches!(
            bearer(&StaticTokens(None)),
            Err(ApiError::NoSession)
        ));
        assert!(matches!(
            bearer(&StaticTokens(Some(SessionToken::new("")))),
            Err(ApiError::NoSession)
        ));
        assert_eq!(
            bearer(&StaticTokens(Some(SessionToken::new("t-1")))).unwrap(),
            "t-1"
        );
    }
}
