//! Table catalog.
//!
//! The catalog maps table names to table handles. Commands reach tables
//! only through the narrow interface here; all mutation funnels through
//! the write lock, giving a single-writer discipline should an embedder
//! introduce threads.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::error::{StorageError, StorageResult};
use super::table::Table;

/// Process-level mapping from table name to table handle.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: RwLock<HashMap<String, Table>>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a table under `name`, replacing any prior table of the
    /// same name. Returns the replaced table, if any.
    pub fn install(&self, name: impl Into<String>, table: Table) -> Option<Table> {
        self.tables.write().insert(name.into(), table)
    }

    /// Returns true if a table named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Removes and returns the table named `name`.
    pub fn remove(&self, name: &str) -> Option<Table> {
        self.tables.write().remove(name)
    }

    /// Removes every table.
    pub fn clear(&self) {
        self.tables.write().clear();
    }

    /// Lists the table names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    /// Returns true if the catalog holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }

    /// Runs `f` with shared access to the table named `name`.
    pub fn with_table<R>(
        &self,
        name: &str,
        f: impl FnOnce(&Table) -> StorageResult<R>,
    ) -> StorageResult<R> {
        let tables = self.tables.read();
        let table = tables
            .get(name)
            .ok_or_else(|| StorageError::TableNotFound(name.to_string()))?;
        f(table)
    }

    /// Runs `f` with exclusive access to the table named `name`.
    pub fn with_table_mut<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Table) -> StorageResult<R>,
    ) -> StorageResult<R> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(name)
            .ok_or_else(|| StorageError::TableNotFound(name.to_string()))?;
        f(table)
    }
}
