use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `placeos-api` crate.
///
/// Covers every failure mode of the engine API: the token exchange, the
/// transport, status-mapped entity errors, and response decoding.
/// `placeos-core` maps these one-to-one into `CoreError`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token exchange failed (bad credentials, non-2xx, malformed token body),
    /// or the API rejected the bearer token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out before a response was read.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The caller cancelled the request before it completed.
    #[error("Request cancelled")]
    Cancelled,

    /// TLS configuration error (unreadable or invalid CA certificate).
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Entity API ──────────────────────────────────────────────────
    /// HTTP 404 on an entity item path.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// 4xx with a body on create/update (the server refused the payload).
    #[error("Validation failed (HTTP {status}): {message}")]
    Validation { status: u16, message: String },

    /// Any other non-success status (5xx, unexpected codes).
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A request body could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A list the caller needs at least one element from came back empty.
    #[error("No results: {what}")]
    EmptyResult { what: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying
    /// (for idempotent requests only).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Validation { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
