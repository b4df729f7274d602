// Connection facade
//
// `Provider::connect` turns a `ProviderConfig` into a ready session: one
// shared reqwest client, an authorized `AuthSession`, and a `RestClient`
// from which per-kind entity clients and reconcilers are handed out.

use std::sync::Arc;

use placeos_api::{AccessToken, AuthSession, EntityClient, EntityKind, RestClient};
use tracing::info;

use crate::config::ProviderConfig;
use crate::error::CoreError;
use crate::reconcile::Reconciler;
use crate::retry::RetryPolicy;

/// An authenticated connection to one engine.
#[derive(Debug)]
pub struct Provider {
    rest: RestClient,
    retry: RetryPolicy,
}

impl Provider {
    /// Build the transport and authorize. Fails fast on bad credentials.
    pub async fn connect(config: &ProviderConfig) -> Result<Self, CoreError> {
        let provider = Self::new(config)?;
        let token = provider.rest.session().authorize().await?;
        info!(
            host = %config.host,
            username = %config.username,
            expires_in = ?token.expires_in,
            "connected"
        );
        Ok(provider)
    }

    /// Build without contacting the engine; the first call authorizes.
    pub fn new(config: &ProviderConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let http = transport.build_client()?;
        let session = AuthSession::with_client(http.clone(), &config.host, config.credentials())?
            .with_refresh_threshold(config.refresh_threshold);
        let rest = RestClient::with_client(http, &config.host, Arc::new(session), config.timeout)?;
        Ok(Self {
            rest,
            retry: config.retry,
        })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// The token currently held by the session.
    pub async fn token(&self) -> Option<AccessToken> {
        self.rest.session().token().await
    }

    pub fn entities<K: EntityKind>(&self) -> EntityClient<'_, K> {
        EntityClient::new(&self.rest)
    }

    pub fn reconciler<K: EntityKind>(&self) -> Reconciler<'_, K> {
        Reconciler::new(self.entities()).with_retry(self.retry)
    }
}
