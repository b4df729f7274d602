//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a stable exit code.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use placeos_config::ConfigError;
use placeos_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 6;
    pub const TIMEOUT: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the engine: {reason}")]
    #[diagnostic(
        code(placeos::connection_failed),
        help("Check that the host is correct and reachable.")
    )]
    ConnectionFailed { reason: String },

    #[error("TLS error: {message}")]
    #[diagnostic(
        code(placeos::tls_error),
        help(
            "Configure ca_cert in your profile for a private CA,\n\
             or pass --insecure (-k) for a development engine."
        )
    )]
    Tls { message: String },

    #[error("Request timed out after {timeout:?}")]
    #[diagnostic(
        code(placeos::timeout),
        help("Increase the timeout with --timeout or check engine responsiveness.")
    )]
    Timeout { timeout: Duration },

    #[error("Request cancelled")]
    #[diagnostic(code(placeos::cancelled))]
    Cancelled,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(placeos::auth_failed),
        help(
            "Verify the username, password, client id and client secret.\n\
             Secrets are read from password_env / client_secret_env,\n\
             PLACEOS_PASSWORD / PLACEOS_CLIENT_SECRET, or the profile."
        )
    )]
    AuthFailed { message: String },

    #[error("No {what} configured for profile '{profile}'")]
    #[diagnostic(
        code(placeos::no_credentials),
        help("Add it to the profile or set the matching PLACEOS_* environment variable.")
    )]
    NoCredentials { what: String, profile: String },

    // ── Entities ─────────────────────────────────────────────────────
    #[error("{kind} '{id}' not found")]
    #[diagnostic(
        code(placeos::not_found),
        help("Run: placeos list {kind}")
    )]
    NotFound { kind: String, id: String },

    #[error("Nothing returned: {what}")]
    #[diagnostic(code(placeos::empty_result))]
    EmptyResult { what: String },

    #[error("Engine rejected the request (HTTP {status}): {message}")]
    #[diagnostic(
        code(placeos::rejected),
        help("The engine validated the payload and refused it. Check the fields file.")
    )]
    Rejected { status: u16, message: String },

    #[error("Engine error (HTTP {status}): {message}")]
    #[diagnostic(code(placeos::api_error))]
    Api { status: u16, message: String },

    #[error("Unexpected response from the engine: {message}")]
    #[diagnostic(code(placeos::unexpected_response), help("Re-run with -vvv to log the raw body."))]
    UnexpectedResponse { message: String },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(placeos::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid fields file {path}: {reason}")]
    #[diagnostic(
        code(placeos::fields_file),
        help("Only settable fields of the kind are accepted; server-owned fields are rejected.")
    )]
    FieldsFile { path: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(code(placeos::profile_not_found), help("Available profiles: {available}"))]
    ProfileNotFound { name: String, available: String },

    #[error("No engine configured")]
    #[diagnostic(
        code(placeos::no_config),
        help(
            "Pass --host or set PLACEOS_HOST, or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(placeos::config))]
    Config(Box<figment::Error>),

    // ── Output ───────────────────────────────────────────────────────
    #[error("Failed to render output: {message}")]
    #[diagnostic(code(placeos::render))]
    Render { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::EmptyResult { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. }
            | Self::FieldsFile { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::Tls { message } => CliError::Tls { message },
            CoreError::InvalidUrl { message } => CliError::Validation {
                field: "host".into(),
                reason: message,
            },
            CoreError::Timeout { timeout } => CliError::Timeout { timeout },
            CoreError::Cancelled => CliError::Cancelled,
            CoreError::NotFound { kind, id } => CliError::NotFound {
                kind: kind.into(),
                id,
            },
            CoreError::Validation { status, message } => CliError::Rejected { status, message },
            CoreError::Api { status, message } => CliError::Api { status, message },
            CoreError::Deserialization { message, body } => {
                tracing::trace!(%body, "undecodable response body");
                CliError::UnexpectedResponse { message }
            }
            CoreError::Serialization { message } => CliError::Validation {
                field: "fields".into(),
                reason: message,
            },
            CoreError::EmptyResult { what } => CliError::EmptyResult { what },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::MissingCredential { what, profile } => CliError::NoCredentials {
                what: what.into(),
                profile,
            },
            ConfigError::Figment(e) => CliError::Config(e),
        }
    }
}
