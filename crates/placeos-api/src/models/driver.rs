use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::{EntityKind, UpdateMode};

/// What a driver talks to. Serialized as the engine's integer code.
///
/// Codes this client does not name are kept as `Other` and written back
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum DriverRole {
    /// SSH session (0).
    Ssh,
    /// Raw TCP/UDP device (1).
    Device,
    /// HTTP service (2).
    Service,
    Websocket,
    /// Pure logic, no transport (99).
    Logic,
    Other(i64),
}

impl From<i64> for DriverRole {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Ssh,
            1 => Self::Device,
            2 => Self::Service,
            3 => Self::Websocket,
            99 => Self::Logic,
            other => Self::Other(other),
        }
    }
}

impl From<DriverRole> for i64 {
    fn from(role: DriverRole) -> Self {
        match role {
            DriverRole::Ssh => 0,
            DriverRole::Device => 1,
            DriverRole::Service => 2,
            DriverRole::Websocket => 3,
            DriverRole::Logic => 99,
            DriverRole::Other(code) => code,
        }
    }
}

impl fmt::Display for DriverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh => f.write_str("ssh"),
            Self::Device => f.write_str("device"),
            Self::Service => f.write_str("service"),
            Self::Websocket => f.write_str("websocket"),
            Self::Logic => f.write_str("logic"),
            Self::Other(code) => write!(f, "role {code}"),
        }
    }
}

/// A driver compiled from a file in a repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Path of the driver source inside its repository.
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub default_uri: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub role: Option<DriverRole>,
    #[serde(default)]
    pub module_name: Option<String>,
    #[serde(default)]
    pub repository_id: Option<String>,
    #[serde(default)]
    pub ignore_connected: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<DriverRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_connected: Option<bool>,
}

impl EntityKind for Driver {
    const NAME: &'static str = "driver";
    const COLLECTION: &'static str = "drivers";
    const UPDATE_MODE: UpdateMode = UpdateMode::FullReplace;
    const SETTABLE: &'static [&'static str] = &[
        "name",
        "description",
        "file_name",
        "default_uri",
        "commit",
        "role",
        "module_name",
        "repository_id",
        "ignore_connected",
    ];

    type Entity = Self;
    type Fields = DriverFields;

    fn id(entity: &Self) -> &str {
        &entity.id
    }
}
