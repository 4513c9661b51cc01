//! HTTP client for the task API.
//!
//! Four operation groups: auth (`/user/login`), registration
//! (`/user/register`), task reads (`/task/getAll`), and task mutations
//! (`/task/create`, `/task/update/{id}`, `/task/delete/{id}`).  Task
//! operations carry `Authorization: Bearer <token>` from the session store.
//!
//! Mutations apply a dual success check: the transport status must be 2xx AND
//! the response `message` must exactly match the expected confirmation string.
//! A 2xx with the wrong message is a failure, and the caller must not assume
//! the underlying state changed.
//!
//! Every failure maps into [`ApiError`]; nothing is retried here — one attempt
//! per user-triggered action.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::tasks::{Task, TaskFields};

// ─── Expected confirmation messages ──────────────────────────────────────────

const MSG_CREATED: &str = "Task created successfully";
const MSG_UPDATED: &str = "Task updated successfully";
const MSG_DELETED: &str = "Task deleted successfully";

// ─── API types ────────────────────────────────────────────────────────────────

/// Sign-in / registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: LoginUser,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    token: String,
}

#[derive(Debug, Deserialize)]
struct TaskListResponse {
    tasks: Vec<Task>,
}

/// `{ message }` body shared by mutation confirmations and error responses.
#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

// ─── Client ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Exchange credentials for a session token.
    ///
    /// Does NOT touch the session store — the caller decides whether to
    /// commit the returned token.  Any transport or non-2xx outcome is
    /// [`ApiError::Auth`].
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<String, ApiError> {
        debug!(email = %credentials.email, "authenticating");
        let resp = self
            .http
            .post(self.url("/user/login"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| ApiError::Auth(e.to_string()))?;

        if !resp.status().is_success() {
            let message = read_message(resp)
                .await
                .unwrap_or_else(|| "invalid email or password".to_string());
            return Err(ApiError::Auth(message));
        }
        let body: LoginResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Auth(format!("malformed login response: {e}")))?;
        Ok(body.user.token)
    }

    /// Create an account.  Success is signaled by status 201 and nothing else;
    /// any other outcome — including a plain 200 — is [`ApiError::Registration`].
    pub async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        debug!(email = %credentials.email, "registering");
        let resp = self
            .http
            .post(self.url("/user/register"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| ApiError::Registration(e.to_string()))?;

        if resp.status() == StatusCode::CREATED {
            return Ok(());
        }
        let message = read_message(resp)
            .await
            .unwrap_or_else(|| "please try again".to_string());
        Err(ApiError::Registration(message))
    }

    /// Fetch the full task list, in server order.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let resp = self
            .with_auth(self.http.get(self.url("/task/getAll")))
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let message = read_message(resp).await;
            return Err(protocol_error(status, message));
        }
        let body: TaskListResponse = resp.json().await.map_err(|e| ApiError::Server {
            status: status.as_u16(),
            message: format!("malformed task list: {e}"),
        })?;
        Ok(body.tasks)
    }

    pub async fn create_task(&self, fields: &TaskFields) -> Result<(), ApiError> {
        let resp = self
            .with_auth(self.http.post(self.url("/task/create")).json(fields))
            .send()
            .await
            .map_err(transport_error)?;
        expect_confirmation(resp, MSG_CREATED).await
    }

    pub async fn update_task(&self, id: &str, fields: &TaskFields) -> Result<(), ApiError> {
        let resp = self
            .with_auth(
                self.http
                    .put(self.url(&format!("/task/update/{id}")))
                    .json(fields),
            )
            .send()
            .await
            .map_err(transport_error)?;
        expect_confirmation(resp, MSG_UPDATED).await
    }

    /// Issue a delete for `id` unconditionally — no client-side existence
    /// pre-check; the server decides.
    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let resp = self
            .with_auth(self.http.delete(self.url(&format!("/task/delete/{id}"))))
            .send()
            .await
            .map_err(transport_error)?;
        expect_confirmation(resp, MSG_DELETED).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer token when a session exists.  Without one the
    /// request still goes out bare and the server's 401 drives the normal
    /// unauthorized handling.
    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.current_token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

// ─── Failure mapping ──────────────────────────────────────────────────────────

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

/// Map a non-success status into the taxonomy: 401/403 unauthorized, 400/422
/// validation, everything else a server error.
fn protocol_error(status: StatusCode, message: Option<String>) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::Validation(message.unwrap_or_else(|| "invalid input".to_string()))
        }
        _ => ApiError::Server {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            }),
        },
    }
}

/// Dual success check for mutations: 2xx AND the exact confirmation message.
async fn expect_confirmation(resp: reqwest::Response, expected: &str) -> Result<(), ApiError> {
    let status = resp.status();
    let message = read_message(resp).await;
    if !status.is_success() {
        return Err(protocol_error(status, message));
    }
    match message {
        Some(ref m) if m == expected => Ok(()),
        other => Err(ApiError::Server {
            status: status.as_u16(),
            message: other
                .unwrap_or_else(|| format!("missing confirmation (expected \"{expected}\")")),
        }),
    }
}

/// Best-effort extraction of a `{ message }` body; non-JSON bodies yield None.
async fn read_message(resp: reqwest::Response) -> Option<String> {
    let text = resp.text().await.ok()?;
    serde_json::from_str::<MessageBody>(&text)
        .ok()
        .and_then(|b| b.message)
}
