// Generic CRUD over a declared entity kind
//
// One implementation serves every kind: paths come from `K::COLLECTION`,
// the update verb from `K::UPDATE_MODE`. This is also where HTTP status
// codes become typed errors.

use std::marker::PhantomData;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::client::{CallOptions, RawResponse, RestClient, body_preview};
use crate::error::Error;
use crate::kind::EntityKind;

/// CRUD client for one entity kind, borrowing the shared `RestClient`.
pub struct EntityClient<'a, K: EntityKind> {
    rest: &'a RestClient,
    options: CallOptions,
    _kind: PhantomData<K>,
}

impl<'a, K: EntityKind> EntityClient<'a, K> {
    pub fn new(rest: &'a RestClient) -> Self {
        Self {
            rest,
            options: CallOptions::default(),
            _kind: PhantomData,
        }
    }

    /// Apply per-call options (timeout, cancellation) to every request
    /// made through this client.
    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn rest(&self) -> &'a RestClient {
        self.rest
    }

    pub(crate) fn options(&self) -> &CallOptions {
        &self.options
    }

    fn item_path(id: &str) -> String {
        format!("{}/{id}", K::COLLECTION)
    }

    /// `POST /{collection}` with only the settable fields present in `fields`.
    ///
    /// The response is authoritative: it carries the server-assigned id
    /// and timestamps.
    pub async fn create(&self, fields: &K::Fields) -> Result<K::Entity, Error> {
        let body = encode(fields)?;
        info!(kind = K::NAME, "creating entity");

        let raw = self
            .rest
            .execute(Method::POST, K::COLLECTION, Some(&body), &self.options)
            .await?;
        check_status(K::NAME, "", &raw)?;

        let entity: K::Entity = decode(&raw)?;
        if K::id(&entity).is_empty() {
            return Err(Error::Deserialization {
                message: format!("created {} carried no id", K::NAME),
                body: raw.text().into_owned(),
            });
        }
        info!(kind = K::NAME, id = K::id(&entity), "entity created");
        Ok(entity)
    }

    /// `GET /{collection}/{id}`.
    pub async fn read(&self, id: &str) -> Result<K::Entity, Error> {
        ensure_id(K::NAME, id)?;
        debug!(kind = K::NAME, id, "reading entity");

        let raw = self
            .rest
            .execute(Method::GET, &Self::item_path(id), None, &self.options)
            .await?;
        check_status(K::NAME, id, &raw)?;
        decode(&raw)
    }

    /// `GET /{collection}`.
    pub async fn list(&self) -> Result<Vec<K::Entity>, Error> {
        debug!(kind = K::NAME, "listing entities");

        let raw = self
            .rest
            .execute(Method::GET, K::COLLECTION, None, &self.options)
            .await?;
        check_status(K::NAME, "", &raw)?;
        decode(&raw)
    }

    /// Update with the kind's fixed verb: `PUT` for full-replace kinds,
    /// `PATCH` for partial kinds. `fields` is sent exactly as given.
    pub async fn update(&self, id: &str, fields: &K::Fields) -> Result<K::Entity, Error> {
        ensure_id(K::NAME, id)?;
        let body = encode(fields)?;
        let method = K::UPDATE_MODE.method();
        let sent: Vec<&str> = body
            .as_object()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        info!(kind = K::NAME, id, %method, fields = ?sent, "updating entity");

        let raw = self
            .rest
            .execute(method, &Self::item_path(id), Some(&body), &self.options)
            .await?;
        check_status(K::NAME, id, &raw)?;
        decode(&raw)
    }

    /// `DELETE /{collection}/{id}`. A vanished id surfaces as `NotFound`.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        ensure_id(K::NAME, id)?;
        info!(kind = K::NAME, id, "deleting entity");

        let raw = self
            .rest
            .execute(Method::DELETE, &Self::item_path(id), None, &self.options)
            .await?;
        check_status(K::NAME, id, &raw)
    }
}

fn ensure_id(kind: &'static str, id: &str) -> Result<(), Error> {
    if id.is_empty() {
        return Err(Error::NotFound {
            kind,
            id: String::new(),
        });
    }
    Ok(())
}

fn encode(fields: &impl Serialize) -> Result<serde_json::Value, Error> {
    Ok(serde_json::to_value(fields)?)
}

/// Map a non-success status onto the error taxonomy.
pub(crate) fn check_status(kind: &'static str, id: &str, raw: &RawResponse) -> Result<(), Error> {
    let status = raw.status;
    if status.is_success() {
        return Ok(());
    }

    let text = raw.text();
    let message = if text.trim().is_empty() {
        status.to_string()
    } else {
        body_preview(&text).to_owned()
    };

    Err(match status {
        StatusCode::UNAUTHORIZED => Error::Authentication {
            message: format!("bearer token rejected: {message}"),
        },
        StatusCode::NOT_FOUND => Error::NotFound {
            kind,
            id: id.to_owned(),
        },
        s if s.is_client_error() => Error::Validation {
            status: s.as_u16(),
            message,
        },
        s => Error::Api {
            status: s.as_u16(),
            message,
        },
    })
}

pub(crate) fn decode<T: DeserializeOwned>(raw: &RawResponse) -> Result<T, Error> {
    serde_json::from_slice(&raw.body).map_err(|e| {
        let body = raw.text().into_owned();
        Error::Deserialization {
            message: format!("{e} (body preview: {:?})", body_preview(&body)),
            body,
        }
    })
}
