// ── Entity kind descriptors ──
//
// Every entity kind the engine exposes is declared once here: its
// collection path, the update verb the server accepts, and which fields a
// client may set. `EntityClient<K>` implements CRUD once on top of this.

use std::fmt;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::models::{Driver, Module, Repository, Setting, System, Zone};

/// How an update call must be shaped for a kind.
///
/// The engine does not tolerate the wrong verb silently: a PUT against a
/// partial-only endpoint nulls every omitted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// `PUT` carrying every settable field.
    FullReplace,
    /// `PATCH` carrying only the fields being changed.
    Partial,
}

impl UpdateMode {
    pub fn method(self) -> Method {
        match self {
            Self::FullReplace => Method::PUT,
            Self::Partial => Method::PATCH,
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullReplace => f.write_str("full-replace"),
            Self::Partial => f.write_str("partial"),
        }
    }
}

/// Static description of an entity kind.
///
/// `Entity` is the full server representation; `Fields` holds only
/// settable fields, each optional, where `None` means "not part of the
/// desired configuration".
pub trait EntityKind: Send + Sync + 'static {
    /// Singular name used in logs and errors (`"driver"`).
    const NAME: &'static str;
    /// Collection path under the API base (`"drivers"`).
    const COLLECTION: &'static str;
    const UPDATE_MODE: UpdateMode;
    /// Wire names of the fields a client may send on create/update.
    const SETTABLE: &'static [&'static str];
    /// Settable fields the server does not reliably echo back. These are
    /// only compared when the snapshot actually carries a value.
    const WRITE_ONLY: &'static [&'static str] = &[];

    type Entity: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync;
    type Fields: Serialize + DeserializeOwned + Clone + fmt::Debug + Default + PartialEq + Send + Sync;

    /// Server-assigned identifier of an entity (empty before creation).
    fn id(entity: &Self::Entity) -> &str;
}

/// Runtime handle for choosing a kind by name (CLI, logs).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Kind {
    #[strum(serialize = "repository", serialize = "repositories", to_string = "repository")]
    Repository,
    #[strum(serialize = "driver", serialize = "drivers", to_string = "driver")]
    Driver,
    #[strum(serialize = "module", serialize = "modules", to_string = "module")]
    Module,
    #[strum(serialize = "zone", serialize = "zones", to_string = "zone")]
    Zone,
    #[strum(serialize = "system", serialize = "systems", to_string = "system")]
    System,
    #[strum(serialize = "setting", serialize = "settings", to_string = "setting")]
    Setting,
}

/// One row of the kind table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    pub name: &'static str,
    pub collection: &'static str,
    pub update_mode: UpdateMode,
    pub settable: &'static [&'static str],
}

impl KindInfo {
    fn of<K: EntityKind>() -> Self {
        Self {
            name: K::NAME,
            collection: K::COLLECTION,
            update_mode: K::UPDATE_MODE,
            settable: K::SETTABLE,
        }
    }
}

impl Kind {
    pub fn info(self) -> KindInfo {
        match self {
            Self::Repository => KindInfo::of::<Repository>(),
            Self::Driver => KindInfo::of::<Driver>(),
            Self::Module => KindInfo::of::<Module>(),
            Self::Zone => KindInfo::of::<Zone>(),
            Self::System => KindInfo::of::<System>(),
            Self::Setting => KindInfo::of::<Setting>(),
        }
    }
}
