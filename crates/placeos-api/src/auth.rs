// OAuth password-grant session
//
// `AuthSession` owns the bearer token for the lifetime of a connection.
// Every outbound call goes through `bearer()`, which hands out the current
// token or refreshes it under a single-writer lock once its remaining
// lifetime falls below the refresh threshold.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::client::body_preview;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Token endpoint, relative to the engine host.
pub const TOKEN_PATH: &str = "/auth/oauth/token";

/// Scope requested on every grant.
pub const TOKEN_SCOPE: &str = "public";

/// Refresh once less than this much lifetime remains.
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(60);

/// Login material for the password grant. Immutable once a session exists.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    /// OAuth application id, sent as the Basic auth user.
    pub client_id: String,
    pub client_secret: SecretString,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    created_at: Option<i64>,
}

/// A bearer token issued by the engine's token endpoint.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: SecretString,
    pub token_type: String,
    /// Lifetime in seconds. `None` means the server gave no expiry.
    pub expires_in: Option<u64>,
    pub refresh_token: Option<SecretString>,
    pub scope: Option<String>,
    /// Server-side issue time (unix seconds), as reported.
    pub created_at: Option<i64>,
    /// Local receipt time. Expiry is measured from here so that clock skew
    /// against the engine cannot make a token look fresher than it is.
    pub issued_at: DateTime<Utc>,
}

impl AccessToken {
    fn from_response(resp: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        Self {
            access_token: SecretString::from(resp.access_token),
            token_type: resp.token_type.unwrap_or_else(|| "Bearer".into()),
            expires_in: resp.expires_in,
            refresh_token: resp
                .refresh_token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            scope: resp.scope,
            created_at: resp.created_at,
            issued_at,
        }
    }

    /// Absolute expiry, if the token has one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        self.issued_at.checked_add_signed(TimeDelta::try_seconds(secs)?)
    }

    /// Lifetime left at `now`. Zero once expired, `None` if it never expires.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        let expires_at = self.expires_at()?;
        Some((expires_at - now).to_std().unwrap_or(Duration::ZERO))
    }

    /// Whether the token should be replaced before use at `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.remaining_at(now)
            .is_some_and(|remaining| remaining <= threshold)
    }
}

/// Authenticated session against one engine host.
///
/// Shared by reference (`Arc<AuthSession>`) between every REST call.
/// Reads take the token lock shared; refreshes are serialized through a
/// separate mutex so concurrent callers trigger at most one token exchange.
pub struct AuthSession {
    http: reqwest::Client,
    token_url: Url,
    credentials: Credentials,
    refresh_threshold: Duration,
    token: RwLock<Option<AccessToken>>,
    refresh: Mutex<()>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token_url", &self.token_url.as_str())
            .field("username", &self.credentials.username)
            .field("client_id", &self.credentials.client_id)
            .field("refresh_threshold", &self.refresh_threshold)
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// Create a session for `host` using the shared transport settings.
    ///
    /// Does not contact the server; call [`authorize()`](Self::authorize)
    /// or let the first [`bearer()`](Self::bearer) do it.
    pub fn new(
        host: &Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, host, credentials)
    }

    /// Create a session with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        host: &Url,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let token_url = token_endpoint(host);
        Ok(Self {
            http,
            token_url,
            credentials,
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            token: RwLock::new(None),
            refresh: Mutex::new(()),
        })
    }

    pub fn with_refresh_threshold(mut self, threshold: Duration) -> Self {
        self.refresh_threshold = threshold;
        self
    }

    pub fn refresh_threshold(&self) -> Duration {
        self.refresh_threshold
    }

    /// Perform the password grant and store the resulting token.
    ///
    /// `POST {host}/auth/oauth/token` with Basic auth built from the
    /// client id and secret.
    pub async fn authorize(&self) -> Result<AccessToken, Error> {
        let _guard = self.refresh.lock().await;
        let token = self.password_grant().await?;
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    /// The bearer token to send on the next call.
    ///
    /// Returns the held token while it has more than the refresh threshold
    /// left. Otherwise refreshes it: refresh-token grant when a refresh
    /// token is held, password grant when not (or when the refresh fails).
    pub async fn bearer(&self) -> Result<SecretString, Error> {
        if let Some(secret) = self.fresh_token().await {
            return Ok(secret);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(secret) = self.fresh_token().await {
            return Ok(secret);
        }

        let refresh_token = self
            .token
            .read()
            .await
            .as_ref()
            .and_then(|t| t.refresh_token.clone());

        let token = match refresh_token {
            Some(refresh) => match self.refresh_grant(&refresh).await {
                Ok(token) => token,
                Err(e) => {
                    warn!(error = %e, "refresh grant failed, falling back to password grant");
                    self.password_grant().await?
                }
            },
            None => self.password_grant().await?,
        };

        let secret = token.access_token.clone();
        *self.token.write().await = Some(token);
        Ok(secret)
    }

    /// Drop the held token so the next [`bearer()`](Self::bearer) re-authorizes.
    pub async fn invalidate(&self) {
        debug!("invalidating access token");
        *self.token.write().await = None;
    }

    /// A copy of the currently held token, if any.
    pub async fn token(&self) -> Option<AccessToken> {
        self.token.read().await.clone()
    }

    async fn fresh_token(&self) -> Option<SecretString> {
        let guard = self.token.read().await;
        let token = guard.as_ref()?;
        if token.needs_refresh(Utc::now(), self.refresh_threshold) {
            None
        } else {
            Some(token.access_token.clone())
        }
    }

    async fn password_grant(&self) -> Result<AccessToken, Error> {
        let body = json!({
            "grant_type": "password",
            "username": self.credentials.username,
            "password": self.credentials.password.expose_secret(),
            "scope": TOKEN_SCOPE,
        });
        self.exchange("password", &body).await
    }

    async fn refresh_grant(&self, refresh_token: &SecretString) -> Result<AccessToken, Error> {
        let body = json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token.expose_secret(),
            "scope": TOKEN_SCOPE,
        });
        self.exchange("refresh_token", &body).await
    }

    async fn exchange(&self, grant: &str, body: &serde_json::Value) -> Result<AccessToken, Error> {
        debug!(grant, url = %self.token_url, "requesting access token");

        let resp = self
            .http
            .post(self.token_url.clone())
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("token request failed: {e}"),
            })?;

        let status = resp.status();
        let raw = resp.text().await.map_err(|e| Error::Authentication {
            message: format!("failed to read token response: {e}"),
        })?;

        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!(
                    "token exchange failed (HTTP {status}): {}",
                    body_preview(&raw)
                ),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&raw).map_err(|e| Error::Authentication {
                message: format!("malformed token response: {e}"),
            })?;

        if parsed.access_token.is_empty() {
            return Err(Error::Authentication {
                message: "token response carried an empty access_token".into(),
            });
        }

        info!(grant, expires_in = ?parsed.expires_in, "access token acquired");
        Ok(AccessToken::from_response(parsed, Utc::now()))
    }
}

/// `https://host[/prefix]` -> `https://host[/prefix]/auth/oauth/token`
fn token_endpoint(host: &Url) -> Url {
    let mut url = host.clone();
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}{TOKEN_PATH}"));
    url.set_query(None);
    url
}
