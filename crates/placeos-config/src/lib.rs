//! Configuration for PlaceOS tools.
//!
//! TOML profiles layered with `PLACEOS_*` environment variables,
//! credential resolution (env + plaintext), and translation to
//! `placeos_core::ProviderConfig`. The CLI adds flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use placeos_core::{ProviderConfig, RetryPolicy, TlsVerification};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "PLACEOS_CONFIG";
/// Fallback password source when a profile names none.
pub const PASSWORD_ENV: &str = "PLACEOS_PASSWORD";
/// Fallback client secret source when a profile names none.
pub const CLIENT_SECRET_ENV: &str = "PLACEOS_CLIENT_SECRET";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    ProfileNotFound { name: String },

    #[error("no {what} configured for profile '{profile}'")]
    MissingCredential { what: &'static str, profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named engine profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Refresh the token once fewer than this many seconds remain.
    #[serde(default = "default_refresh_threshold")]
    pub refresh_threshold: u64,

    /// Retries for transient read failures. Writes are never retried.
    #[serde(default)]
    pub read_retries: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            refresh_threshold: default_refresh_threshold(),
            read_retries: 0,
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_refresh_threshold() -> u64 {
    60
}

/// A named engine profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Engine root URL (e.g. "https://placeos.example.com").
    pub host: String,

    pub username: Option<String>,

    /// Plaintext password. Prefer `password_env`.
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// OAuth application id.
    pub client_id: Option<String>,

    /// Plaintext client secret. Prefer `client_secret_env`.
    pub client_secret: Option<String>,

    pub client_secret_env: Option<String>,

    /// Skip TLS verification. Off unless set.
    pub insecure: Option<bool>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub timeout: Option<u64>,

    pub refresh_threshold: Option<u64>,

    pub read_retries: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$PLACEOS_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("tech", "place", "placeos").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("placeos");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `PLACEOS_*` variables.
///
/// Nested keys use a double underscore:
/// `PLACEOS_PROFILES__PROD__HOST=https://placeos.example.com`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("PLACEOS_")
                .ignore(&["config", "password", "client_secret", "profile"])
                .split("__"),
        );

    Ok(figment.extract()?)
}

/// Pick a profile: the explicit name, else `default_profile`, else the
/// only profile when exactly one exists.
pub fn select_profile<'a>(
    config: &'a Config,
    name: Option<&str>,
) -> Result<(String, &'a Profile), ConfigError> {
    if let Some(name) = name {
        return config
            .profiles
            .get(name)
            .map(|profile| (name.to_owned(), profile))
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() });
    }

    if let Some(default) = config.default_profile.as_deref() {
        if let Some(profile) = config.profiles.get(default) {
            return Ok((default.to_owned(), profile));
        }
    }

    let mut profiles = config.profiles.iter();
    match (profiles.next(), profiles.next()) {
        (Some((name, profile)), None) => Ok((name.clone(), profile)),
        _ => Err(ConfigError::ProfileNotFound {
            name: config
                .default_profile
                .clone()
                .unwrap_or_else(|| "default".into()),
        }),
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a secret: the profile's named env var, then the global env
/// var, then plaintext from the file.
fn resolve_secret(
    env_name: Option<&str>,
    global_env: &str,
    plaintext: Option<&str>,
    what: &'static str,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(value) = env_name.and_then(|name| std::env::var(name).ok()) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var(global_env) {
        return Ok(SecretString::from(value));
    }
    if let Some(value) = plaintext {
        return Ok(SecretString::from(value.to_owned()));
    }
    Err(ConfigError::MissingCredential {
        what,
        profile: profile_name.into(),
    })
}

pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.password_env.as_deref(),
        PASSWORD_ENV,
        profile.password.as_deref(),
        "password",
        profile_name,
    )
}

pub fn resolve_client_secret(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.client_secret_env.as_deref(),
        CLIENT_SECRET_ENV,
        profile.client_secret.as_deref(),
        "client secret",
        profile_name,
    )
}

/// TLS mode for a profile. System roots unless configured otherwise.
pub fn resolve_tls(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ProviderConfig` from a profile, falling back to `defaults`.
pub fn profile_to_provider_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ProviderConfig, ConfigError> {
    let host: Url = profile.host.parse().map_err(|e| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid URL '{}': {e}", profile.host),
    })?;
    if !matches!(host.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("unsupported scheme '{}'", host.scheme()),
        });
    }

    let username = profile
        .username
        .clone()
        .ok_or_else(|| ConfigError::MissingCredential {
            what: "username",
            profile: profile_name.into(),
        })?;
    let client_id = profile
        .client_id
        .clone()
        .ok_or_else(|| ConfigError::MissingCredential {
            what: "client id",
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;
    let client_secret = resolve_client_secret(profile, profile_name)?;

    let mut config = ProviderConfig::new(host, username, password, client_id, client_secret);
    config.tls = resolve_tls(profile);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.refresh_threshold =
        Duration::from_secs(profile.refresh_threshold.unwrap_or(defaults.refresh_threshold));
    config.retry = RetryPolicy::new(profile.read_retries.unwrap_or(defaults.read_retries));
    Ok(config)
}
