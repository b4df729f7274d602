// Desired-vs-observed field comparison
//
// `diff` is a pure function over JSON objects: it reports which keys of
// the desired configuration differ from the observed snapshot. Keys the
// desired side leaves out are never reported, so server-owned fields
// cannot show up as changes.

use std::collections::BTreeSet;

use placeos_api::EntityKind;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Names of changed fields, ordered for stable logs and tests.
pub type FieldSet = BTreeSet<String>;

type Object = Map<String, Value>;

/// Keys in `desired` whose value differs from (or is missing in) `observed`.
pub fn diff(desired: &Object, observed: &Object) -> FieldSet {
    desired
        .iter()
        .filter(|(key, value)| observed.get(key.as_str()) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Typed [`diff`] for one kind.
///
/// Write-only fields are dropped from the result when the snapshot has no
/// usable value for them (missing, `null` or `""`); the engine does not
/// echo them, so comparing would report a change on every run.
pub fn changed_fields<K: EntityKind>(
    desired: &K::Fields,
    observed: &K::Entity,
) -> Result<FieldSet, serde_json::Error> {
    let desired = to_object(desired)?;
    let observed = to_object(observed)?;

    let mut changed = diff(&desired, &observed);
    for field in K::WRITE_ONLY {
        if !has_value(observed.get(*field)) {
            changed.remove(*field);
        }
    }
    Ok(changed)
}

/// Body for a full-replace update: every settable field the snapshot
/// carries, overlaid with the desired values.
pub fn full_replace_payload<K: EntityKind>(
    desired: &K::Fields,
    observed: &K::Entity,
) -> Result<K::Fields, serde_json::Error> {
    let mut payload: Object = to_object(observed)?
        .into_iter()
        .filter(|(key, value)| {
            K::SETTABLE.contains(&key.as_str())
                && !value.is_null()
                && (!K::WRITE_ONLY.contains(&key.as_str()) || has_value(Some(value)))
        })
        .collect();
    payload.extend(to_object(desired)?);
    from_object(payload)
}

/// Body for a partial update: exactly the changed subset of `desired`.
pub fn partial_payload<K: EntityKind>(
    desired: &K::Fields,
    changed: &FieldSet,
) -> Result<K::Fields, serde_json::Error> {
    let payload: Object = to_object(desired)?
        .into_iter()
        .filter(|(key, _)| changed.contains(key))
        .collect();
    from_object(payload)
}

fn has_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

fn to_object(value: &impl Serialize) -> Result<Object, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn from_object<T: DeserializeOwned>(map: Object) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(map))
}
