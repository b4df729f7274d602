// ── Core error types ──
//
// Errors surfaced to orchestrators (the CLI, embedding applications).
// Every `placeos_api::Error` maps onto exactly one variant here; nothing
// is folded into a generic catch-all.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach engine: {reason}")]
    ConnectionFailed { reason: String },

    #[error("TLS error: {message}")]
    Tls { message: String },

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Operation cancelled")]
    Cancelled,

    // ── Entity errors ────────────────────────────────────────────────
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Rejected by engine (HTTP {status}): {message}")]
    Validation { status: u16, message: String },

    #[error("Engine error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    Deserialization { message: String, body: String },

    #[error("Desired fields could not be encoded: {message}")]
    Serialization { message: String },

    #[error("Nothing returned: {what}")]
    EmptyResult { what: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<placeos_api::Error> for CoreError {
    fn from(err: placeos_api::Error) -> Self {
        match err {
            placeos_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            placeos_api::Error::Transport(e) => CoreError::ConnectionFailed {
                reason: match e.url() {
                    Some(url) => format!("{url}: {e}"),
                    None => e.to_string(),
                },
            },
            placeos_api::Error::Tls(message) => CoreError::Tls { message },
            placeos_api::Error::InvalidUrl(e) => CoreError::InvalidUrl {
                message: e.to_string(),
            },
            placeos_api::Error::Timeout { timeout } => CoreError::Timeout { timeout },
            placeos_api::Error::Cancelled => CoreError::Cancelled,
            placeos_api::Error::NotFound { kind, id } => CoreError::NotFound { kind, id },
            placeos_api::Error::Validation { status, message } => {
                CoreError::Validation { status, message }
            }
            placeos_api::Error::Api { status, message } => CoreError::Api { status, message },
            placeos_api::Error::Deserialization { message, body } => {
                CoreError::Deserialization { message, body }
            }
            placeos_api::Error::Serialization(e) => CoreError::Serialization {
                message: e.to_string(),
            },
            placeos_api::Error::EmptyResult { what } => CoreError::EmptyResult { what },
        }
    }
}
