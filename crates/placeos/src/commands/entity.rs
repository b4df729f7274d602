//! Generic entity handlers: get, list, delete, apply.

use std::path::Path;

use placeos_core::{EntityKind, Managed, Outcome, Provider};

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn get<K: EntityKind>(
    provider: &Provider,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let entity = provider
        .entities::<K>()
        .read(id)
        .await
        .map_err(placeos_core::CoreError::from)?;
    let out = output::render_entity(global.output, &entity)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn list<K: EntityKind>(provider: &Provider, global: &GlobalOpts) -> Result<(), CliError> {
    let entities = provider
        .entities::<K>()
        .list()
        .await
        .map_err(placeos_core::CoreError::from)?;
    let out = output::render_entities(global.output, &entities)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn delete<K: EntityKind>(
    provider: &Provider,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut managed = Managed::<K>::existing(id);
    if managed.id().is_none() {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: "must not be empty".into(),
        });
    }
    provider.reconciler::<K>().destroy(&mut managed).await?;
    if !global.quiet {
        eprintln!("{} '{id}' deleted", K::NAME);
    }
    Ok(())
}

/// Converge one entity to the fields in `args.file`.
pub async fn apply<K: EntityKind>(
    provider: &Provider,
    args: &ApplyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let desired: K::Fields = read_fields(&args.file)?;

    let mut managed = match args.id.as_deref() {
        Some(id) => Managed::<K>::existing(id),
        None => Managed::<K>::absent(),
    };

    let outcome = provider
        .reconciler::<K>()
        .reconcile(&mut managed, &desired)
        .await?;

    if !global.quiet {
        let id = managed.id().unwrap_or_default();
        match outcome {
            Outcome::Created => eprintln!("{} '{id}' created", K::NAME),
            Outcome::Updated { changed } => {
                let fields: Vec<&str> = changed.iter().map(String::as_str).collect();
                eprintln!("{} '{id}' updated: {}", K::NAME, fields.join(", "));
            }
            Outcome::Unchanged => eprintln!("{} '{id}' unchanged", K::NAME),
        }
    }

    if let Some(entity) = managed.snapshot() {
        let out = output::render_entity(global.output, entity)?;
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

/// Parse a desired-fields file; the format follows the extension.
fn read_fields<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let fields_error = |reason: String| CliError::FieldsFile {
        path: path.display().to_string(),
        reason,
    };

    let text = std::fs::read_to_string(path).map_err(|e| fields_error(e.to_string()))?;
    let ext = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_str(&text).map_err(|e| fields_error(e.to_string())),
        Some("toml") => toml::from_str(&text).map_err(|e| fields_error(e.to_string())),
        _ => serde_json::from_str(&text).map_err(|e| fields_error(e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use placeos_core::{ModuleFields, ZoneFields};

    use super::*;

    fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
        (dir, path)
    }

    #[test]
    fn reads_fields_by_extension() {
        let (_d, json) = write_temp("zone.json", r#"{"name": "Level 3"}"#);
        let (_d2, yaml) = write_temp("zone.yaml", "name: Level 3\n");
        let (_d3, toml) = write_temp("zone.toml", "name = \"Level 3\"\n");

        for path in [json, yaml, toml] {
            let fields: ZoneFields = read_fields(&path).unwrap();
            assert_eq!(fields.name.as_deref(), Some("Level 3"));
        }
    }

    #[test]
    fn unreadable_file_is_a_fields_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = read_fields::<ZoneFields>(&missing).unwrap_err();
        match err {
            CliError::FieldsFile { ref path, .. } => assert!(path.ends_with("absent.json")),
            ref other => panic!("expected FieldsFile, got {other:?}"),
        }
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }

    #[test]
    fn server_owned_fields_are_rejected() {
        let (_d, path) = write_temp("module.json", r#"{"id": "mod-1", "port": 80}"#);
        let err = read_fields::<ModuleFields>(&path).unwrap_err();
        assert!(matches!(err, CliError::FieldsFile { .. }));
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}
