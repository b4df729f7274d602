// placeos-core: Reconciliation of desired entity configuration against a
// PlaceOS engine, on top of placeos-api.

pub mod config;
pub mod diff;
pub mod error;
pub mod provider;
pub mod reconcile;
pub mod retry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ProviderConfig, TlsVerification};
pub use diff::{FieldSet, changed_fields, diff};
pub use error::CoreError;
pub use provider::Provider;
pub use reconcile::{LifecycleState, Managed, Outcome, Reconciler};
pub use retry::RetryPolicy;

// Entity types, so orchestrators need only this crate.
pub use placeos_api::models::timestamp;
pub use placeos_api::{
    CallOptions, Commit, Driver, DriverFields, DriverRole, EncryptionLevel, EntityClient,
    EntityKind, Kind, Module, ModuleFields, Repository, RepositoryFields, Setting, SettingFields,
    System, SystemFields, UpdateMode, Zone, ZoneFields,
};
