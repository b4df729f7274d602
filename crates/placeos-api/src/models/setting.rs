use serde::{Deserialize, Serialize};

use crate::kind::{EntityKind, UpdateMode};

/// Who may read a setting's decrypted value. Serialized as an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum EncryptionLevel {
    #[default]
    None,
    Support,
    Admin,
    NeverDisplay,
}

impl TryFrom<i64> for EncryptionLevel {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Support),
            2 => Ok(Self::Admin),
            3 => Ok(Self::NeverDisplay),
            other => Err(format!("unknown encryption level {other}")),
        }
    }
}

impl From<EncryptionLevel> for i64 {
    fn from(level: EncryptionLevel) -> Self {
        match level {
            EncryptionLevel::None => 0,
            EncryptionLevel::Support => 1,
            EncryptionLevel::Admin => 2,
            EncryptionLevel::NeverDisplay => 3,
        }
    }
}

/// A YAML/JSON settings document attached to a parent entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Bumped by the engine on every write.
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// `ControlSystem`, `Module`, `Driver` or `Zone`.
    #[serde(default)]
    pub parent_type: Option<String>,
    #[serde(default)]
    pub settings_string: Option<String>,
    #[serde(default)]
    pub encryption_level: Option<EncryptionLevel>,
    /// Top-level keys the engine parsed out of `settings_string`.
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_level: Option<EncryptionLevel>,
}

impl EntityKind for Setting {
    const NAME: &'static str = "setting";
    const COLLECTION: &'static str = "settings";
    const UPDATE_MODE: UpdateMode = UpdateMode::FullReplace;
    const SETTABLE: &'static [&'static str] = &[
        "name",
        "parent_id",
        "parent_type",
        "settings_string",
        "encryption_level",
    ];

    type Entity = Self;
    type Fields = SettingFields;

    fn id(entity: &Self) -> &str {
        &entity.id
    }
}
