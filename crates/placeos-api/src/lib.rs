// placeos-api: Async Rust client for the PlaceOS engine REST API
//
// Layers, leaf-first: `auth` (password-grant session + token refresh),
// `transport` (shared reqwest settings), `client` (authenticated request
// executor), `kind` + `entity` (generic CRUD over declared entity kinds),
// `models` (wire types for each kind).

pub mod auth;
pub mod client;
pub mod entity;
pub mod error;
pub mod kind;
pub mod models;
pub mod transport;

pub use auth::{AccessToken, AuthSession, Credentials};
pub use client::{CallOptions, RawResponse, RestClient};
pub use entity::EntityClient;
pub use error::Error;
pub use kind::{EntityKind, Kind, KindInfo, UpdateMode};
pub use models::{
    Commit, Driver, DriverFields, DriverRole, EncryptionLevel, Module, ModuleFields, Repository,
    RepositoryFields, Setting, SettingFields, System, SystemFields, Zone, ZoneFields,
};
pub use transport::{TlsMode, TransportConfig};
