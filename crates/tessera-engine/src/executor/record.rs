//! Record representation for the row store.
//!
//! A record is an ordered vector of cells, one per table column in
//! declaration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::{Value, ValueKind};

/// One column's entry in a record: kind tag, payload size, value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Kind tag matching the owning column.
    pub kind: ValueKind,
    /// Payload size in bytes at the time the cell was written.
    pub size: usize,
    /// The stored value.
    pub value: Value,
}

impl Cell {
    /// Creates a cell for a value stored under a column of `kind`.
    pub fn new(kind: ValueKind, value: Value) -> Self {
        Self {
            kind,
            size: value.size(),
            value,
        }
    }
}

/// A single row of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    cells: Vec<Cell>,
}

impl Record {
    /// Creates a record from cells in declaration order.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the record has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell at `position`.
    pub fn cell(&self, position: usize) -> Option<&Cell> {
        self.cells.get(position)
    }

    /// Returns the value at `position`.
    pub fn value(&self, position: usize) -> Option<&Value> {
        self.cells.get(position).map(|c| &c.value)
    }

    /// Replaces the value at `position`, refreshing the cell size.
    ///
    /// Out-of-range positions are ignored.
    pub fn set_value(&mut self, position: usize, value: Value) {
        if let Some(cell) = self.cells.get_mut(position) {
            cell.size = value.size();
            cell.value = value;
        }
    }

    /// Returns an iterator over the cells.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().map(|c| &c.value)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", cell.value)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        Record::new(vec![
            Cell::new(ValueKind::Id, Value::int(0)),
            Cell::new(ValueKind::String, Value::string("alice")),
            Cell::new(ValueKind::Bool, Value::boolean(true)),
        ])
    }

    #[test]
    fn test_record_len() {
        assert_eq!(sample_record().len(), 3);
        assert!(!sample_record().is_empty());
    }

    #[test]
    fn test_record_value_access() {
        let record = sample_record();
        assert_eq!(record.value(0), Some(&Value::int(0)));
        assert_eq!(record.value(1), Some(&Value::string("alice")));
        assert_eq!(record.value(3), None);
    }

    #[test]
    fn test_record_set_value_updates_size() {
        let mut record = sample_record();
        record.set_value(1, Value::string("bob"));
        let cell = record.cell(1).unwrap();
        assert_eq!(cell.value, Value::string("bob"));
        assert_eq!(cell.size, 3);
    }

    #[test]
    fn test_record_set_value_out_of_range() {
        let mut record = sample_record();
        record.set_value(9, Value::int(1));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_cell_size() {
        let cell = Cell::new(ValueKind::Bytes, Value::bytes(vec![1u8, 2, 3]));
        assert_eq!(cell.size, 3);
    }

    #[test]
    fn test_record_display() {
        assert_eq!(sample_record().to_string(), "(0, alice, true)");
    }
}
