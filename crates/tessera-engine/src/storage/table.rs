//! In-memory tables.
//!
//! A table owns its columns, a slot arena of records, per-column ordered
//! indexes, and per-column auto-increment counters. Records live in a
//! stable slot sequence; deletion tombstones a slot, so indexes can hold
//! plain slot numbers and surviving records keep their insertion order.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::executor::{Cell, Predicate, Record, Value, View};

use super::column::Column;
use super::error::{StorageError, StorageResult};

/// Ordered multimap from a column value to the slots carrying it.
type OrderedIndex = BTreeMap<Value, Vec<usize>>;

/// A typed in-memory table.
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    positions: HashMap<String, usize>,
    key_column: Option<usize>,
    unique_columns: Vec<usize>,
    index_columns: Vec<usize>,
    default_columns: Vec<usize>,
    counters: HashMap<String, i32>,
    indexes: HashMap<String, OrderedIndex>,
    slots: Vec<Option<Record>>,
}

impl Table {
    /// Creates a table from its column declarations.
    ///
    /// Column names must be unique. If no declared column is unique, the
    /// reserved `id` column is appended and becomes the key column.
    pub fn new(name: impl Into<String>, mut columns: Vec<Column>) -> StorageResult<Self> {
        let name = name.into();

        if !columns.iter().any(|c| c.is_unique()) {
            columns.push(Column::id());
        }

        let mut positions = HashMap::new();
        let mut key_column = None;
        let mut unique_columns = Vec::new();
        let mut index_columns = Vec::new();
        let mut default_columns = Vec::new();
        let mut counters = HashMap::new();
        let mut indexes = HashMap::new();

        for (position, column) in columns.iter().enumerate() {
            if positions
                .insert(column.name().to_string(), position)
                .is_some()
            {
                return Err(StorageError::DuplicateColumn(column.name().to_string()));
            }
            if column.is_key() && key_column.is_none() {
                key_column = Some(position);
            }
            if column.is_unique() {
                unique_columns.push(position);
            }
            if column.is_index() {
                index_columns.push(position);
                indexes.insert(column.name().to_string(), OrderedIndex::new());
            }
            if column.is_auto_increment() {
                counters.insert(column.name().to_string(), 0);
            }
            if column.default().is_some() {
                default_columns.push(position);
            }
        }

        Ok(Self {
            name,
            columns,
            positions,
            key_column,
            unique_columns,
            index_columns,
            default_columns,
            counters,
            indexes,
            slots: Vec::new(),
        })
    }

    /// Rebuilds a table from restored columns and records.
    ///
    /// Indexes are rebuilt from scratch and every auto-increment counter
    /// resumes past the largest stored value, so identifiers are never
    /// reused after a reload.
    pub(crate) fn restore(
        name: impl Into<String>,
        columns: Vec<Column>,
        records: Vec<Record>,
    ) -> StorageResult<Self> {
        let mut table = Self::new(name, columns)?;

        for record in records {
            if record.len() != table.columns.len() {
                return Err(StorageError::Format(format!(
                    "record has {} fields, table has {} columns",
                    record.len(),
                    table.columns.len()
                )));
            }
            let slot = table.slots.len();
            table.attach_to_indexes(&record, slot);
            table.slots.push(Some(record));
        }

        for (name, counter) in table.counters.iter_mut() {
            let position = table.positions[name];
            let max = table
                .slots
                .iter()
                .flatten()
                .filter_map(|r| match r.value(position) {
                    Some(Value::Int(v)) => Some(*v),
                    _ => None,
                })
                .max();
            *counter = max.map_or(0, |m| m + 1);
        }

        Ok(table)
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.positions.get(name).map(|&p| &self.columns[p])
    }

    /// Returns a column's position in the record layout.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Returns the key column, if one is designated.
    pub fn key_column(&self) -> Option<&Column> {
        self.key_column.map(|p| &self.columns[p])
    }

    /// Returns the number of live records.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns true if the table holds no live records.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Returns the live records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.slots.iter().flatten()
    }

    /// Returns the current auto-increment counter of a column.
    pub fn counter(&self, name: &str) -> Option<i32> {
        self.counters.get(name).copied()
    }

    /// Returns the slots carrying `value` in an indexed column's ordered
    /// index, in key order.
    pub fn index_lookup(&self, column: &str, value: &Value) -> Option<&[usize]> {
        self.indexes
            .get(column)
            .and_then(|index| index.get(value))
            .map(Vec::as_slice)
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Inserts a record built from a `name -> value` mapping.
    ///
    /// Defaults fill unsupplied columns, auto-increment columns take
    /// their counter value, and remaining cells take the kind's zero
    /// value. Any validation failure leaves the table unchanged with the
    /// counters unbumped.
    pub fn insert(&mut self, values: HashMap<String, Value>) -> StorageResult<()> {
        self.validate_values(&values)?;

        let record = self.build_record(&values);
        self.check_unique(&record)?;

        for counter in self.counters.values_mut() {
            *counter += 1;
        }
        let slot = self.slots.len();
        self.attach_to_indexes(&record, slot);
        self.slots.push(Some(record));

        debug!(table = %self.name, rows = self.len(), "inserted record");
        Ok(())
    }

    /// Checks an incoming value mapping against the schema.
    fn validate_values(&self, values: &HashMap<String, Value>) -> StorageResult<()> {
        if values.len() > self.columns.len() {
            return Err(StorageError::TooManyValues {
                table: self.name.clone(),
                given: values.len(),
                expected: self.columns.len(),
            });
        }
        for (name, value) in values {
            let column = self
                .column(name)
                .ok_or_else(|| StorageError::UnknownColumn {
                    table: self.name.clone(),
                    column: name.clone(),
                })?;
            if column.is_auto_increment() {
                return Err(StorageError::AutoIncrementWrite {
                    table: self.name.clone(),
                    column: name.clone(),
                });
            }
            column.check_value(&self.name, value)?;
        }
        Ok(())
    }

    /// Builds a record: defaults, then supplied values, then counters.
    ///
    /// Counters are read but not bumped; the caller bumps them once the
    /// record is committed.
    fn build_record(&self, values: &HashMap<String, Value>) -> Record {
        let mut cells: Vec<Cell> = self
            .columns
            .iter()
            .map(|c| Cell::new(c.cell_kind(), Value::zero_for(c.kind())))
            .collect();

        for &position in &self.default_columns {
            let column = &self.columns[position];
            if let Some(default) = column.default() {
                cells[position] = Cell::new(column.cell_kind(), default.clone());
            }
        }
        for (name, value) in values {
            let position = self.positions[name];
            cells[position] = Cell::new(self.columns[position].cell_kind(), value.clone());
        }
        for (name, counter) in &self.counters {
            let position = self.positions[name];
            cells[position] = Cell::new(self.columns[position].cell_kind(), Value::Int(*counter));
        }

        Record::new(cells)
    }

    /// Scans the live records for unique-column collisions with a
    /// candidate record.
    fn check_unique(&self, candidate: &Record) -> StorageResult<()> {
        for &position in &self.unique_columns {
            let new_value = candidate.value(position);
            for record in self.records() {
                if record.value(position) == new_value {
                    return Err(StorageError::UniqueViolation {
                        table: self.name.clone(),
                        column: self.columns[position].name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Adds a committed record's values to every ordered index.
    fn attach_to_indexes(&mut self, record: &Record, slot: usize) {
        for &position in &self.index_columns {
            let name = self.columns[position].name().to_string();
            if let (Some(value), Some(index)) = (record.value(position), self.indexes.get_mut(&name))
            {
                index.entry(value.clone()).or_default().push(slot);
            }
        }
    }

    /// Removes a record's values from every ordered index.
    fn detach_from_indexes(&mut self, record: &Record, slot: usize) {
        for &position in &self.index_columns {
            let name = self.columns[position].name().to_string();
            if let (Some(value), Some(index)) = (record.value(position), self.indexes.get_mut(&name))
            {
                if let Some(slots) = index.get_mut(value) {
                    slots.retain(|&s| s != slot);
                    if slots.is_empty() {
                        index.remove(value);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Select
    // =========================================================================

    /// Projects the table through an optional predicate.
    ///
    /// An empty projection selects every column. Records are tested in
    /// insertion order; an absent predicate accepts all of them.
    pub fn select(
        &self,
        projection: &[String],
        predicate: Option<&Predicate>,
    ) -> StorageResult<View> {
        let (columns, positions) = if projection.is_empty() {
            (
                self.columns.clone(),
                self.positions.clone(),
            )
        } else {
            let mut columns = Vec::with_capacity(projection.len());
            let mut positions = HashMap::with_capacity(projection.len());
            for name in projection {
                let position =
                    self.position_of(name)
                        .ok_or_else(|| StorageError::UnknownColumn {
                            table: self.name.clone(),
                            column: name.clone(),
                        })?;
                columns.push(self.columns[position].clone());
                positions.insert(name.clone(), position);
            }
            (columns, positions)
        };

        let mut records = Vec::new();
        for record in self.records() {
            let keep = match predicate {
                Some(p) => p.matches(record, self)?,
                None => true,
            };
            if keep {
                records.push(record.clone());
            }
        }

        Ok(View::new(self.name.clone(), columns, positions, records))
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Assigns new values to every record matching the predicate.
    ///
    /// The assignment map obeys the insert shape rules. Unique collisions
    /// are detected before any cell is written, so a failed update leaves
    /// the table unchanged. Returns the number of updated records.
    pub fn update(
        &mut self,
        predicate: Option<&Predicate>,
        values: HashMap<String, Value>,
    ) -> StorageResult<usize> {
        self.validate_values(&values)?;

        let matched = self.matching_slots(predicate)?;
        if matched.is_empty() {
            return Ok(0);
        }

        for (name, value) in &values {
            let position = self.positions[name];
            if !self.columns[position].is_unique() {
                continue;
            }
            // Writing one unique value into several records would break
            // the constraint by itself.
            if matched.len() > 1 {
                return Err(StorageError::UniqueViolation {
                    table: self.name.clone(),
                    column: name.clone(),
                });
            }
            for (slot, record) in self.slots.iter().enumerate() {
                let Some(record) = record else { continue };
                if matched.contains(&slot) {
                    continue;
                }
                if record.value(position) == Some(value) {
                    return Err(StorageError::UniqueViolation {
                        table: self.name.clone(),
                        column: name.clone(),
                    });
                }
            }
        }

        for &slot in &matched {
            for (name, value) in &values {
                let position = self.positions[name];
                let indexed = self.indexes.contains_key(name);
                if indexed {
                    if let Some(record) = self.slots[slot].take() {
                        self.detach_from_indexes(&record, slot);
                        self.slots[slot] = Some(record);
                    }
                }
                if let Some(record) = self.slots[slot].as_mut() {
                    record.set_value(position, value.clone());
                }
                if indexed {
                    if let Some(record) = self.slots[slot].take() {
                        self.attach_to_indexes(&record, slot);
                        self.slots[slot] = Some(record);
                    }
                }
            }
        }

        debug!(table = %self.name, updated = matched.len(), "updated records");
        Ok(matched.len())
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Removes every record matching the predicate (all records when the
    /// predicate is absent). Returns the number of removed records.
    pub fn delete(&mut self, predicate: Option<&Predicate>) -> StorageResult<usize> {
        let matched = self.matching_slots(predicate)?;

        for &slot in &matched {
            if let Some(record) = self.slots[slot].take() {
                self.detach_from_indexes(&record, slot);
            }
        }

        debug!(table = %self.name, deleted = matched.len(), "deleted records");
        Ok(matched.len())
    }

    /// Collects the slots of live records matching the predicate.
    fn matching_slots(&self, predicate: Option<&Predicate>) -> StorageResult<Vec<usize>> {
        let mut matched = Vec::new();
        for (slot, record) in self.slots.iter().enumerate() {
            let Some(record) = record else { continue };
            let keep = match predicate {
                Some(p) => p.matches(record, self)?,
                None => true,
            };
            if keep {
                matched.push(slot);
            }
        }
        Ok(matched)
    }
}
