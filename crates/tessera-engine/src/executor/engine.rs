//! Statement execution.
//!
//! The `Engine` owns the catalog and runs the full pipeline: lexer,
//! parser, statement dispatch. It is an explicit, long-lived object
//! rather than a process-wide singleton, so tests and embedders can hold
//! several engines at once.

use std::path::Path;

use tracing::debug;

use tessera_common::TesseraResult;

use crate::parser::{Parser, Statement};
use crate::storage::{dump_table, load_table, Catalog, Table};

use super::view::View;

/// The in-process database engine.
#[derive(Debug, Default)]
pub struct Engine {
    catalog: Catalog,
}

impl Engine {
    /// Creates an engine with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Lists the catalog's table names.
    pub fn table_names(&self) -> Vec<String> {
        self.catalog.names()
    }

    /// Parses and executes one statement.
    ///
    /// Selects return a view; the mutating statements return `None`.
    pub fn execute(&self, source: &str) -> TesseraResult<Option<View>> {
        let statement = Parser::parse(source)?;
        self.execute_statement(statement)
    }

    /// Executes an already parsed statement against the catalog.
    pub fn execute_statement(&self, statement: Statement) -> TesseraResult<Option<View>> {
        debug!(statement = statement.keyword(), "executing statement");
        match statement {
            Statement::CreateTable(create) => {
                let table = Table::new(create.name.clone(), create.columns)?;
                let replaced = self.catalog.install(create.name.clone(), table);
                debug!(
                    table = %create.name,
                    replaced = replaced.is_some(),
                    "installed table"
                );
                Ok(None)
            }
            Statement::Insert(insert) => {
                self.catalog
                    .with_table_mut(&insert.table, |t| t.insert(insert.values))?;
                Ok(None)
            }
            Statement::Select(select) => {
                let view = self.catalog.with_table(&select.table, |t| {
                    t.select(&select.projection, select.predicate.as_ref())
                })?;
                Ok(Some(view))
            }
            Statement::Update(update) => {
                self.catalog.with_table_mut(&update.table, |t| {
                    t.update(update.predicate.as_ref(), update.assignments)
                })?;
                Ok(None)
            }
            Statement::Delete(delete) => {
                self.catalog
                    .with_table_mut(&delete.table, |t| t.delete(delete.predicate.as_ref()))?;
                Ok(None)
            }
        }
    }

    /// Dumps the named table to a text file.
    pub fn dump_table(&self, name: &str, path: &Path) -> TesseraResult<()> {
        self.catalog.with_table(name, |t| dump_table(t, path))?;
        Ok(())
    }

    /// Restores a table from a dump, installing it under its dumped name
    /// and replacing any table already carrying that name. Returns the
    /// name.
    pub fn load_table(&self, path: &Path) -> TesseraResult<String> {
        let table = load_table(path)?;
        let name = table.name().to_string();
        self.catalog.install(name.clone(), table);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Value;
    use tessera_common::TesseraError;

    fn engine_with_users() -> Engine {
        let engine = Engine::new();
        engine
            .execute(
                "create table users ({key, autoincrement} id: int32, \
                 {unique} login: string[32], is_admin: bool = false)",
            )
            .unwrap();
        engine
    }

    #[test]
    fn test_create_insert_select() {
        let engine = engine_with_users();
        engine
            .execute("insert (login = \"a\", is_admin = true) to users")
            .unwrap();

        let view = engine.execute("select * from users").unwrap().unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view.value(0, "id"), Some(&Value::Int(0)));
        assert_eq!(view.value(0, "login"), Some(&Value::string("a")));
        assert_eq!(view.value(0, "is_admin"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_mutating_statements_return_none() {
        let engine = engine_with_users();
        assert!(engine
            .execute("insert (login = \"a\") to users")
            .unwrap()
            .is_none());
        assert!(engine
            .execute("update users set is_admin = true where id = 0")
            .unwrap()
            .is_none());
        assert!(engine.execute("delete users").unwrap().is_none());
    }

    #[test]
    fn test_unknown_table() {
        let engine = Engine::new();
        let err = engine.execute("select * from ghost").unwrap_err();
        assert!(matches!(err, TesseraError::NotFound(_)));
    }

    #[test]
    fn test_create_replaces_existing() {
        let engine = engine_with_users();
        engine
            .execute("insert (login = \"a\") to users")
            .unwrap();

        engine
            .execute("create table users ({unique} login: string[8])")
            .unwrap();
        let view = engine.execute("select * from users").unwrap().unwrap();
        assert!(view.is_empty());
        assert_eq!(engine.table_names(), vec!["users".to_string()]);
    }

    #[test]
    fn test_parse_errors_surface() {
        let engine = Engine::new();
        assert!(matches!(
            engine.execute("explain users").unwrap_err(),
            TesseraError::Parse(_)
        ));
        assert!(matches!(
            engine.execute("select * from t where x = 0x").unwrap_err(),
            TesseraError::Lex(_)
        ));
    }

    #[test]
    fn test_dump_and_load() {
        let engine = engine_with_users();
        engine
            .execute("insert (login = \"a\", is_admin = true) to users")
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        engine.dump_table("users", &path).unwrap();

        let other = Engine::new();
        let name = other.load_table(&path).unwrap();
        assert_eq!(name, "users");

        let view = other.execute("select * from users").unwrap().unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view.value(0, "login"), Some(&Value::string("a")));
    }

    #[test]
    fn test_dump_unknown_table() {
        let engine = Engine::new();
        let dir = tempfile::tempdir().unwrap();
        let err = engine
            .dump_table("ghost", &dir.path().join("x.db"))
            .unwrap_err();
        assert!(matches!(err, TesseraError::NotFound(_)));
    }
}
