// Engine API wire types
//
// One module per entity kind. Each holds the full entity as the server
// returns it and a `*Fields` struct carrying only what a client may set.
// Entity fields are `Option` with `#[serde(default)]` because the engine
// sends `null` or omits fields freely; unknown fields land in `extra`.

use chrono::{DateTime, Utc};

mod driver;
mod module;
mod repository;
mod setting;
mod system;
mod zone;

pub use driver::{Driver, DriverFields, DriverRole};
pub use module::{Module, ModuleFields};
pub use repository::{Commit, Repository, RepositoryFields};
pub use setting::{EncryptionLevel, Setting, SettingFields};
pub use system::{System, SystemFields};
pub use zone::{Zone, ZoneFields};

/// Server timestamps are unix seconds.
pub fn timestamp(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}
