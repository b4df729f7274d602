//! Output formatting: table, JSON, YAML, plain.
//!
//! Entities are rendered through their JSON form, so one set of renderers
//! serves every kind. Tables use `tabled`.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of entities: a summary table, structured data, or ids.
pub fn render_entities<T: Serialize>(format: OutputFormat, data: &[T]) -> Result<String, CliError> {
    let values: Vec<Value> = data.iter().map(to_value).collect::<Result<_, _>>()?;
    match format {
        OutputFormat::Table => Ok(render_table(values.iter().map(entity_row))),
        OutputFormat::Plain => Ok(values
            .iter()
            .map(|v| text_field(v, "id"))
            .collect::<Vec<_>>()
            .join("\n")),
        _ => render_structured(format, &values),
    }
}

/// Render one entity: a field/value table, structured data, or its id.
pub fn render_entity<T: Serialize>(format: OutputFormat, data: &T) -> Result<String, CliError> {
    let value = to_value(data)?;
    match format {
        OutputFormat::Table => {
            let rows = value
                .as_object()
                .into_iter()
                .flatten()
                .filter(|(_, v)| !v.is_null())
                .map(|(field, v)| FieldRow {
                    field: field.clone(),
                    value: display_value(field, v),
                });
            Ok(render_table(rows))
        }
        OutputFormat::Plain => Ok(text_field(&value, "id")),
        _ => render_structured(format, &value),
    }
}

/// Render any serializable list with a caller-supplied row type.
pub fn render_rows<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => Ok(render_table(data.iter().map(to_row))),
        OutputFormat::Plain => Ok(data.iter().map(id_fn).collect::<Vec<_>>().join("\n")),
        _ => render_structured(format, data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(render_error)?,
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(render_error)?,
        _ => serde_json::to_string_pretty(data).map_err(render_error)?,
    };
    Ok(rendered.trim_end().to_owned())
}

fn render_error(e: impl std::fmt::Display) -> CliError {
    CliError::Render {
        message: e.to_string(),
    }
}

fn to_value<T: Serialize>(data: &T) -> Result<Value, CliError> {
    serde_json::to_value(data).map_err(render_error)
}

// ── Cell helpers ─────────────────────────────────────────────────────

fn entity_row(value: &Value) -> EntityRow {
    let name = match text_field(value, "name") {
        name if name.is_empty() => text_field(value, "custom_name"),
        name => name,
    };
    EntityRow {
        id: text_field(value, "id"),
        name,
        updated: value
            .get("updated_at")
            .and_then(Value::as_i64)
            .map(format_timestamp)
            .unwrap_or_default(),
    }
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn display_value(field: &str, value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if field.ends_with("_at") => {
            n.as_i64().map_or_else(|| n.to_string(), format_timestamp)
        }
        Value::Array(items) => items
            .iter()
            .map(|item| display_value("", item))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn format_timestamp(secs: i64) -> String {
    placeos_core::timestamp(Some(secs))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}
