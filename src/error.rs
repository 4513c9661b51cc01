// SPDX-License-Identifier: MIT
//! Failure taxonomy for calls against the task API.
//!
//! Every outbound operation resolves to exactly one of these variants; nothing
//! is swallowed and nothing is retried.  Each variant carries a short message
//! suitable for showing to the user as-is.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure — the request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the session token (missing, expired, or invalid).
    #[error("session expired or invalid — please sign in again")]
    Unauthorized,

    /// The server rejected the submitted fields.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Any other non-success outcome, including a 2xx response whose
    /// confirmation message does not match the expected one.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Sign-in did not produce a session token.
    #[error("login failed: {0}")]
    Auth(String),

    /// Registration did not complete (any outcome other than 201).
    #[error("registration failed: {0}")]
    Registration(String),
}

impl ApiError {
    /// True for the 401-class failures that must tear the session down.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
