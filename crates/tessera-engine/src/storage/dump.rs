//! Text persistence for whole tables.
//!
//! A dump is line-oriented: a `#TABLE_NAME` section carrying the name, a
//! `#COLUMNS` section with one CSV line per column descriptor, and a
//! `#DATA` section with a CSV header line followed by one CSV line per
//! record. Fields containing commas or quotes are CSV-escaped. Byte
//! payloads are mapped one byte per character so any value round-trips.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use tessera_common::constants::{
    COLUMN_LINE_FIELDS, DUMP_COLUMNS_MARKER, DUMP_DATA_MARKER, DUMP_TABLE_MARKER,
};

use crate::executor::{Cell, Record, Value, ValueKind};

use super::column::{Column, ColumnFlags};
use super::error::{StorageError, StorageResult};
use super::table::Table;

/// Escapes one CSV field.
///
/// A field containing `,` or `"` is wrapped in double quotes with the
/// internal quotes doubled; other fields pass through unchanged.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        let mut escaped = String::with_capacity(field.len() + 2);
        escaped.push('"');
        for c in field.chars() {
            if c == '"' {
                escaped.push('"');
            }
            escaped.push(c);
        }
        escaped.push('"');
        escaped
    } else {
        field.to_string()
    }
}

/// Splits one CSV line into its fields, honoring quoting.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            if in_quotes && i + 1 < chars.len() && chars[i + 1] == '"' {
                field.push('"');
                i += 1;
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == ',' && !in_quotes {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
        i += 1;
    }
    fields.push(field);
    fields
}

/// Maps a byte payload to its textual form, one character per byte.
fn bytes_to_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Maps the textual form of a byte payload back to bytes.
fn text_to_bytes(text: &str) -> StorageResult<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .map_err(|_| StorageError::Format(format!("invalid byte character '{}'", c)))
        })
        .collect()
}

/// Stringifies a cell value for a record line.
fn encode_value(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Bool(v) => if *v { "true" } else { "false" }.to_string(),
        Value::Str(s) => s.clone(),
        Value::Bytes(b) => bytes_to_text(b),
    }
}

/// Parses a record field under a column kind.
fn decode_value(kind: ValueKind, field: &str) -> StorageResult<Value> {
    match kind {
        ValueKind::Integer | ValueKind::Id => field
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|_| StorageError::Format(format!("invalid integer '{}'", field))),
        ValueKind::Bool => match field {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            other => Err(StorageError::Format(format!("invalid boolean '{}'", other))),
        },
        ValueKind::String => Ok(Value::Str(field.to_string())),
        ValueKind::Bytes => Ok(Value::Bytes(text_to_bytes(field)?)),
        ValueKind::None => Err(StorageError::Format("record field of kind None".to_string())),
    }
}

/// Serializes one column descriptor line.
fn encode_column(column: &Column) -> String {
    let (default_type, default_value) = match column.default() {
        Some(Value::Int(v)) => ("int", v.to_string()),
        Some(Value::Bool(v)) => ("bool", if *v { "true" } else { "false" }.to_string()),
        Some(Value::Str(s)) => ("string", s.clone()),
        Some(Value::Bytes(b)) => ("bytes", bytes_to_text(b)),
        None => ("", String::new()),
    };
    let aux = if column.kind().is_integer() {
        u8::from(column.is_auto_increment()).to_string()
    } else if column.kind().is_sized() {
        column.max_len().to_string()
    } else {
        "0".to_string()
    };

    [
        escape_csv_field(column.kind().as_str()),
        escape_csv_field(column.name()),
        u8::from(column.default().is_some()).to_string(),
        escape_csv_field(default_type),
        escape_csv_field(&default_value),
        u8::from(column.is_unique()).to_string(),
        u8::from(column.is_key()).to_string(),
        u8::from(column.is_index()).to_string(),
        aux,
    ]
    .join(",")
}

/// Reconstructs a column from its descriptor line.
fn decode_column(line: &str) -> StorageResult<Column> {
    let fields = parse_csv_line(line);
    if fields.len() < COLUMN_LINE_FIELDS {
        return Err(StorageError::Format(format!(
            "column line has {} fields, expected {}",
            fields.len(),
            COLUMN_LINE_FIELDS
        )));
    }

    let kind = ValueKind::from_str_opt(&fields[0])
        .ok_or_else(|| StorageError::Format(format!("unknown kind string '{}'", fields[0])))?;
    let name = fields[1].clone();
    let has_default = fields[2] == "1";
    let default = if has_default {
        match fields[3].as_str() {
            "int" => Some(
                fields[4]
                    .parse::<i32>()
                    .map(Value::Int)
                    .map_err(|_| StorageError::Format(format!("invalid default '{}'", fields[4])))?,
            ),
            "bool" => Some(Value::Bool(matches!(fields[4].as_str(), "true" | "1"))),
            "string" => Some(Value::Str(fields[4].clone())),
            "bytes" => Some(Value::Bytes(text_to_bytes(&fields[4])?)),
            "" => None,
            other => {
                return Err(StorageError::Format(format!(
                    "unknown default type '{}'",
                    other
                )))
            }
        }
    } else {
        None
    };

    let flags = ColumnFlags {
        unique: fields[5] == "1",
        key: fields[6] == "1",
        index: fields[7] == "1",
        auto_increment: kind.is_integer() && fields[8] == "1",
    };
    let max_len = if kind.is_sized() {
        fields[8]
            .parse::<usize>()
            .map_err(|_| StorageError::Format(format!("invalid max length '{}'", fields[8])))?
    } else {
        0
    };

    Column::from_parts(kind, name, max_len, default, flags)
}

/// Dumps a whole table (schema and rows) to `path`.
pub fn dump_table(table: &Table, path: &Path) -> StorageResult<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{}", DUMP_TABLE_MARKER)?;
    writeln!(out, "{}", table.name())?;

    writeln!(out, "{}", DUMP_COLUMNS_MARKER)?;
    for column in table.columns() {
        writeln!(out, "{}", encode_column(column))?;
    }

    writeln!(out, "{}", DUMP_DATA_MARKER)?;
    let header: Vec<String> = table
        .columns()
        .iter()
        .map(|c| escape_csv_field(c.name()))
        .collect();
    writeln!(out, "{}", header.join(","))?;

    for record in table.records() {
        let line: Vec<String> = record
            .values()
            .map(|v| escape_csv_field(&encode_value(v)))
            .collect();
        writeln!(out, "{}", line.join(","))?;
    }

    out.flush()?;
    debug!(table = %table.name(), path = %path.display(), "dumped table");
    Ok(())
}

/// Restores a table from a dump written by [`dump_table`].
pub fn load_table(path: &Path) -> StorageResult<Table> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();

    let mut next_line = |what: &str| -> StorageResult<String> {
        match lines.next() {
            Some(line) => Ok(line?),
            None => Err(StorageError::Format(format!("missing {}", what))),
        }
    };

    if next_line(DUMP_TABLE_MARKER)? != DUMP_TABLE_MARKER {
        return Err(StorageError::Format(format!(
            "expected {} marker",
            DUMP_TABLE_MARKER
        )));
    }
    let name = next_line("table name")?;

    if next_line(DUMP_COLUMNS_MARKER)? != DUMP_COLUMNS_MARKER {
        return Err(StorageError::Format(format!(
            "expected {} marker",
            DUMP_COLUMNS_MARKER
        )));
    }

    let mut columns = Vec::new();
    let header = loop {
        let line = next_line("column line or data marker")?;
        if line == DUMP_DATA_MARKER {
            break next_line("header line")?;
        }
        columns.push(decode_column(&line)?);
    };

    let header_fields = parse_csv_line(&header);
    if header_fields.len() != columns.len() {
        return Err(StorageError::Format(format!(
            "header has {} columns, schema has {}",
            header_fields.len(),
            columns.len()
        )));
    }

    let mut records = Vec::new();
    for line in lines {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut fields = parse_csv_line(&line);
        // A trailing comma yields one empty extra field; drop it.
        if fields.len() == columns.len() + 1 && fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }
        if fields.len() != columns.len() {
            return Err(StorageError::Format(format!(
                "record has {} fields, schema has {} columns",
                fields.len(),
                columns.len()
            )));
        }

        let cells: Vec<Cell> = columns
            .iter()
            .zip(fields.iter())
            .map(|(column, field)| {
                decode_value(column.cell_kind(), field)
                    .map(|value| Cell::new(column.cell_kind(), value))
            })
            .collect::<StorageResult<_>>()?;
        records.push(Record::new(cells));
    }

    let table = Table::restore(name, columns, records)?;
    debug!(table = %table.name(), path = %path.display(), rows = table.len(), "loaded table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn users_table() -> Table {
        let columns = vec![
            Column::string("login", 32, None, ColumnFlags::unique()).unwrap(),
            Column::bytes("password_hash", 8, None, ColumnFlags::default()).unwrap(),
            Column::boolean("is_admin", Some(false), ColumnFlags::default()).unwrap(),
        ];
        let mut table = Table::new("users", columns).unwrap();
        for (login, hash, admin) in [
            ("a", vec![0xDEu8, 0xAD], true),
            ("b, \"quoted\"", vec![0xBEu8, 0xEF], false),
        ] {
            let mut values = HashMap::new();
            values.insert("login".to_string(), Value::string(login));
            values.insert("password_hash".to_string(), Value::bytes(hash));
            values.insert("is_admin".to_string(), Value::boolean(admin));
            table.insert(values).unwrap();
        }
        table
    }

    #[test]
    fn test_escape_plain_field() {
        assert_eq!(escape_csv_field("plain"), "plain");
    }

    #[test]
    fn test_escape_round_trip() {
        for (a, b) in [
            ("plain", "also plain"),
            ("with,comma", "with\"quote"),
            ("\"starts", "ends\""),
            ("", "a,b,\"c\""),
        ] {
            let line = format!("{},{}", escape_csv_field(a), escape_csv_field(b));
            assert_eq!(parse_csv_line(&line), vec![a.to_string(), b.to_string()]);
        }
    }

    #[test]
    fn test_parse_csv_line_basic() {
        assert_eq!(
            parse_csv_line("a,b,c"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(
            parse_csv_line("\"a,b\",c"),
            vec!["a,b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_column_line_round_trip() {
        let columns = vec![
            Column::id(),
            Column::string("login", 32, Some("guest".to_string()), ColumnFlags::unique()).unwrap(),
            Column::bytes("hash", 8, None, ColumnFlags::default()).unwrap(),
            Column::boolean("flag", Some(true), ColumnFlags::default()).unwrap(),
            Column::integer("n", Some(7), ColumnFlags::default()).unwrap(),
            Column::string("tag", 4, Some(String::new()), ColumnFlags::default()).unwrap(),
        ];
        for column in columns {
            let restored = decode_column(&encode_column(&column)).unwrap();
            assert_eq!(restored, column);
        }
    }

    #[test]
    fn test_decode_column_unknown_kind() {
        let err = decode_column("Float,x,0,,,0,0,0,0").unwrap_err();
        assert!(matches!(err, StorageError::Format(_)));
    }

    #[test]
    fn test_decode_column_too_few_fields() {
        let err = decode_column("Integer,x,0").unwrap_err();
        assert!(matches!(err, StorageError::Format(_)));
    }

    #[test]
    fn test_dump_load_round_trip() {
        let table = users_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");

        dump_table(&table, &path).unwrap();
        let restored = load_table(&path).unwrap();

        assert_eq!(restored.name(), table.name());
        assert_eq!(restored.columns(), table.columns());
        let original: Vec<&Record> = table.records().collect();
        let loaded: Vec<&Record> = restored.records().collect();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_round_trip_preserves_high_bytes() {
        let columns = vec![Column::bytes("blob", 8, None, ColumnFlags::unique()).unwrap()];
        let mut table = Table::new("blobs", columns).unwrap();
        let payload = vec![0x00u8, 0x7F, 0x80, 0xFF];
        let mut values = HashMap::new();
        values.insert("blob".to_string(), Value::bytes(payload.clone()));
        table.insert(values).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blobs.db");
        dump_table(&table, &path).unwrap();

        let restored = load_table(&path).unwrap();
        let record = restored.records().next().unwrap();
        assert_eq!(record.value(0), Some(&Value::bytes(payload)));
    }

    #[test]
    fn test_round_trip_resumes_counter() {
        let columns = vec![Column::integer("n", None, ColumnFlags::default()).unwrap()];
        let mut table = Table::new("t", columns).unwrap();
        for i in 0..3 {
            let mut values = HashMap::new();
            values.insert("n".to_string(), Value::int(i));
            table.insert(values).unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.db");
        dump_table(&table, &path).unwrap();

        let restored = load_table(&path).unwrap();
        assert_eq!(restored.counter("id"), Some(3));
    }

    #[test]
    fn test_load_accepts_numeric_bool() {
        assert_eq!(
            decode_value(ValueKind::Bool, "1").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            decode_value(ValueKind::Bool, "0").unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            decode_value(ValueKind::Bool, "true").unwrap(),
            Value::Bool(true)
        );
        assert!(decode_value(ValueKind::Bool, "yes").is_err());
    }

    #[test]
    fn test_load_rejects_missing_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.db");
        std::fs::write(&path, "not a dump\n").unwrap();

        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, StorageError::Format(_)));
    }

    #[test]
    fn test_load_rejects_field_count_mismatch() {
        let table = users_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        dump_table(&table, &path).unwrap();

        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("only-one-field\n");
        std::fs::write(&path, content).unwrap();

        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, StorageError::Format(_)));
    }

    #[test]
    fn test_load_accepts_trailing_comma() {
        let columns = vec![Column::integer("n", None, ColumnFlags::unique()).unwrap()];
        let mut table = Table::new("t", columns).unwrap();
        let mut values = HashMap::new();
        values.insert("n".to_string(), Value::int(5));
        table.insert(values).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.db");
        dump_table(&table, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let patched = content.trim_end().to_string() + ",\n";
        std::fs::write(&path, patched).unwrap();

        let restored = load_table(&path).unwrap();
        assert_eq!(restored.len(), 1);
    }
}
