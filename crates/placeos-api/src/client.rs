// Authenticated REST executor for the engine API
//
// Every entity operation funnels through `RestClient::execute`: URL
// construction under `/api/engine/v2/`, bearer injection from the shared
// `AuthSession`, JSON headers, the per-call timeout and cancellation, and
// reading the full body. Status codes are NOT interpreted here beyond
// dropping a token the server rejected; that mapping lives in `entity`.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

use crate::auth::AuthSession;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Path prefix of every entity endpoint.
pub const API_PREFIX: &str = "/api/engine/v2";

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Replaces the client's default timeout for this call.
    pub timeout: Option<Duration>,
    /// Aborts the call with [`Error::Cancelled`] when triggered.
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// A fully read response: status plus raw body bytes.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Truncate a response body for error messages and logs.
pub(crate) fn body_preview(body: &str) -> &str {
    const MAX_CHARS: usize = 200;
    match body.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// HTTP client for the engine API, shared by every `EntityClient`.
#[derive(Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<AuthSession>,
    timeout: Duration,
}

impl RestClient {
    /// Build from the engine host, an auth session and transport settings.
    ///
    /// `host` is the engine root (e.g. `https://placeos.example.com`);
    /// entity paths are resolved under `{host}/api/engine/v2/`.
    pub fn new(
        host: &Url,
        session: Arc<AuthSession>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, host, session, transport.timeout)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        host: &Url,
        session: Arc<AuthSession>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(host);
        Ok(Self {
            http,
            base_url,
            session,
            timeout,
        })
    }

    /// `https://host[/prefix]` -> `https://host[/prefix]/api/engine/v2/`
    fn normalize_base_url(host: &Url) -> Url {
        let mut url = host.clone();
        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with(API_PREFIX) {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}{API_PREFIX}/"));
        }
        url.set_query(None);
        url
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    /// Join a relative path (e.g. `"drivers/driver-abc"`) onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Execute one authenticated request and read the full response.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        options: &CallOptions,
    ) -> Result<RawResponse, Error> {
        self.execute_with_query(method, path, &[], body, options)
            .await
    }

    /// [`execute`](Self::execute) with URL query parameters.
    pub async fn execute_with_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
        options: &CallOptions,
    ) -> Result<RawResponse, Error> {
        let url = self.url(path)?;
        let timeout = options.timeout.unwrap_or(self.timeout);
        let bearer = self.session.bearer().await?;

        debug!(%method, %url, "sending request");

        let mut builder = self
            .http
            .request(method, url)
            .timeout(timeout)
            .bearer_auth(bearer.expose_secret())
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let body = resp.bytes().await?;
            Ok::<_, reqwest::Error>(RawResponse { status, body })
        };

        let result = match &options.cancel {
            Some(token) => tokio::select! {
                () = token.cancelled() => return Err(Error::Cancelled),
                result = exchange => result,
            },
            None => exchange.await,
        };

        let raw = result.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout { timeout }
            } else {
                Error::Transport(e)
            }
        })?;

        if raw.status == StatusCode::UNAUTHORIZED {
            self.session.invalidate().await;
        }

        trace!(status = %raw.status, bytes = raw.body.len(), "response received");
        Ok(raw)
    }
}
