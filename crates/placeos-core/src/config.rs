// ── Runtime connection configuration ──
//
// Describes how to reach one engine. Carries credentials and tuning but
// never touches disk; `placeos-config` (or an embedding application)
// builds a `ProviderConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use placeos_api::auth::DEFAULT_REFRESH_THRESHOLD;
use placeos_api::transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::retry::RetryPolicy;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Only ever set explicitly.
    DangerAcceptInvalid,
}

impl TlsVerification {
    fn to_transport(&self) -> TlsMode {
        match self {
            Self::SystemDefaults => TlsMode::System,
            Self::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            Self::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Everything needed to connect to one engine.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Engine root (e.g. `https://placeos.example.com`).
    pub host: Url,
    pub username: String,
    pub password: SecretString,
    pub client_id: String,
    pub client_secret: SecretString,
    pub tls: TlsVerification,
    /// Default per-request timeout.
    pub timeout: Duration,
    pub refresh_threshold: Duration,
    /// Applied to reads only.
    pub retry: RetryPolicy,
}

impl ProviderConfig {
    pub fn new(
        host: Url,
        username: impl Into<String>,
        password: SecretString,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        Self {
            host,
            username: username.into(),
            password,
            client_id: client_id.into(),
            client_secret,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            retry: RetryPolicy::default(),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::new(self.tls.to_transport(), self.timeout)
    }

    pub(crate) fn credentials(&self) -> placeos_api::Credentials {
        placeos_api::Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}
