//! Output formatting for query results.
//!
//! Supports table, JSON, CSV, and raw output formats.

use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::{json, Value as JsonValue};

use tessera_engine::storage::escape_csv_field;
use tessera_engine::{Value, View};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output.
    Table,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
    /// Raw output (values separated by tabs).
    Raw,
}

impl OutputFormat {
    /// Parses a format name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            "raw" => Some(OutputFormat::Raw),
            _ => None,
        }
    }

    /// Returns the format name.
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Raw => "raw",
        }
    }
}

/// Formats a view according to the specified format.
pub fn format_view(view: &View, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_table(view),
        OutputFormat::Json => format_json(view),
        OutputFormat::Csv => format_csv(view),
        OutputFormat::Raw => format_raw(view),
    }
}

/// Formats the view as a table.
fn format_table(view: &View) -> String {
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(view.column_names().iter().map(|c| Cell::new(c)));

    for row in 0..view.len() {
        let values = view.row_values(row).unwrap_or_default();
        table.add_row(values.iter().map(|v| Cell::new(v.to_string())));
    }

    table.to_string()
}

/// Formats the view as JSON.
fn format_json(view: &View) -> String {
    let names = view.column_names();
    let rows: Vec<JsonValue> = (0..view.len())
        .map(|row| {
            let mut obj = serde_json::Map::new();
            let values = view.row_values(row).unwrap_or_default();
            for (name, value) in names.iter().zip(values) {
                obj.insert((*name).to_string(), value_to_json(value));
            }
            JsonValue::Object(obj)
        })
        .collect();

    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}

/// Converts an engine value to a JSON value.
fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Int(v) => json!(v),
        Value::Bool(v) => json!(v),
        Value::Str(s) => json!(s),
        Value::Bytes(b) => json!(format!("0x{}", hex_encode(b))),
    }
}

/// Lowercase hex rendering of a byte payload, matching the literal
/// syntax of the statement language.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Formats the view as CSV.
fn format_csv(view: &View) -> String {
    let mut out = String::new();

    let header: Vec<String> = view
        .column_names()
        .iter()
        .map(|c| escape_csv_field(c))
        .collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in 0..view.len() {
        let values = view.row_values(row).unwrap_or_default();
        let line: Vec<String> = values
            .iter()
            .map(|v| escape_csv_field(&v.to_string()))
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

/// Formats the view as tab-separated raw values.
fn format_raw(view: &View) -> String {
    let mut out = String::new();
    out.push_str(&view.column_names().join("\t"));
    out.push('\n');
    for row in 0..view.len() {
        let values = view.row_values(row).unwrap_or_default();
        let line: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        out.push_str(&line.join("\t"));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_engine::Engine;

    fn sample_view() -> View {
        let engine = Engine::new();
        engine
            .execute(
                "create table users ({key, autoincrement} id: int32, \
                 {unique} login: string[32], password_hash: bytes[8])",
            )
            .unwrap();
        engine
            .execute("insert (login = \"a,b\", password_hash = 0xdead) to users")
            .unwrap();
        engine.execute("select * from users").unwrap().unwrap()
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::from_name("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("table"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_name("nope"), None);
        assert_eq!(OutputFormat::Csv.name(), "csv");
    }

    #[test]
    fn test_format_json() {
        let view = sample_view();
        let json = format_json(&view);
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["id"], json!(0));
        assert_eq!(parsed[0]["login"], json!("a,b"));
        assert_eq!(parsed[0]["password_hash"], json!("0xdead"));
    }

    #[test]
    fn test_format_csv_escapes() {
        let view = sample_view();
        let csv = format_csv(&view);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,login,password_hash");
        assert!(lines[1].starts_with("0,\"a,b\","));
    }

    #[test]
    fn test_format_raw() {
        let view = sample_view();
        let raw = format_raw(&view);
        assert!(raw.starts_with("id\tlogin\tpassword_hash\n"));
    }

    #[test]
    fn test_format_table_contains_values() {
        let view = sample_view();
        let table = format_table(&view);
        assert!(table.contains("login"));
        assert!(table.contains("a,b"));
    }
}
