use serde::{Deserialize, Serialize};

use super::DriverRole;
use crate::kind::{EntityKind, UpdateMode};

/// A running instance of a driver.
///
/// `role`, `connected` and `running` reflect live engine state and are
/// never sent back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub tls: Option<bool>,
    #[serde(default)]
    pub udp: Option<bool>,
    #[serde(default)]
    pub makebreak: Option<bool>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub custom_name: Option<String>,
    #[serde(default)]
    pub role: Option<DriverRole>,
    #[serde(default)]
    pub connected: Option<bool>,
    #[serde(default)]
    pub running: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub ignore_connected: Option<bool>,
    #[serde(default)]
    pub ignore_startstop: Option<bool>,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub makebreak: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_connected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_startstop: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
}

impl EntityKind for Module {
    const NAME: &'static str = "module";
    const COLLECTION: &'static str = "modules";
    const UPDATE_MODE: UpdateMode = UpdateMode::Partial;
    const SETTABLE: &'static [&'static str] = &[
        "ip",
        "port",
        "tls",
        "udp",
        "makebreak",
        "uri",
        "name",
        "custom_name",
        "notes",
        "ignore_connected",
        "ignore_startstop",
        "driver_id",
    ];

    type Entity = Self;
    type Fields = ModuleFields;

    fn id(entity: &Self) -> &str {
        &entity.id
    }
}
