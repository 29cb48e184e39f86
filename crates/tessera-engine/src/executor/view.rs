//! Projection results.
//!
//! A `View` is the immutable outcome of a select: the projected columns,
//! a name-to-position map into the underlying record layout, and the
//! matching records in insertion order.

use std::collections::HashMap;
use std::fmt;

use crate::storage::Column;

use super::record::Record;
use super::value::Value;

/// The immutable projection result of a select.
#[derive(Debug, Clone)]
pub struct View {
    table_name: String,
    columns: Vec<Column>,
    positions: HashMap<String, usize>,
    records: Vec<Record>,
}

impl View {
    /// Assembles a view.
    ///
    /// `positions` maps each projected column name to its position in the
    /// underlying record layout; `records` are full-width records in
    /// insertion order.
    pub(crate) fn new(
        table_name: impl Into<String>,
        columns: Vec<Column>,
        positions: HashMap<String, usize>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            positions,
            records,
        }
    }

    /// Returns the name of the table the view was selected from.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the projected columns in projection order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the projected column names in projection order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Returns the underlying record position of a projected column.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no record matched.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the matching records.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Returns the value of a projected column in row `row`.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let position = self.position_of(name)?;
        self.records.get(row)?.value(position)
    }

    /// Returns one row's projected values in projection order.
    pub fn row_values(&self, row: usize) -> Option<Vec<&Value>> {
        let record = self.records.get(row)?;
        self.columns
            .iter()
            .map(|c| self.positions.get(c.name()).and_then(|&p| record.value(p)))
            .collect()
    }

    /// Renders the view: a header of projected column names followed by
    /// one line per row, cells stringified by kind.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let header: Vec<&str> = self.columns.iter().map(|c| c.name()).collect();
        out.push_str(&header.join(", "));
        out.push('\n');
        for row in 0..self.records.len() {
            let values = self.row_values(row).unwrap_or_default();
            let line: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            out.push_str(&line.join(", "));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ColumnFlags, Table};
    use std::collections::HashMap as StdHashMap;

    fn users_table() -> Table {
        let columns = vec![
            Column::string("login", 32, None, ColumnFlags::unique()).unwrap(),
            Column::boolean("is_admin", Some(false), ColumnFlags::default()).unwrap(),
        ];
        let mut table = Table::new("users", columns).unwrap();
        for (login, admin) in [("alice", true), ("bob", false)] {
            let mut values = StdHashMap::new();
            values.insert("login".to_string(), Value::string(login));
            values.insert("is_admin".to_string(), Value::boolean(admin));
            table.insert(values).unwrap();
        }
        table
    }

    #[test]
    fn test_full_view() {
        let table = users_table();
        let view = table.select(&[], None).unwrap();

        assert_eq!(view.table_name(), "users");
        assert_eq!(view.len(), 2);
        assert_eq!(view.column_names(), vec!["login", "is_admin"]);
        assert_eq!(view.value(0, "login"), Some(&Value::string("alice")));
        assert_eq!(view.value(1, "is_admin"), Some(&Value::boolean(false)));
    }

    #[test]
    fn test_projected_view_keeps_underlying_positions() {
        let table = users_table();
        let view = table.select(&["is_admin".to_string()], None).unwrap();

        assert_eq!(view.column_names(), vec!["is_admin"]);
        // Position refers to the underlying record layout, not the
        // projection order.
        assert_eq!(view.position_of("is_admin"), Some(1));
        assert_eq!(view.position_of("login"), None);
        assert_eq!(view.value(0, "is_admin"), Some(&Value::boolean(true)));
    }

    #[test]
    fn test_render() {
        let table = users_table();
        let view = table.select(&[], None).unwrap();
        let rendered = view.render();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "login, is_admin");
        assert_eq!(lines[1], "alice, true");
        assert_eq!(lines[2], "bob, false");
    }

    #[test]
    fn test_empty_view_has_columns() {
        let columns =
            vec![Column::integer("n", None, ColumnFlags::unique()).unwrap()];
        let table = Table::new("empty", columns).unwrap();
        let view = table.select(&[], None).unwrap();

        assert!(view.is_empty());
        assert_eq!(view.column_names(), vec!["n"]);
    }
}
