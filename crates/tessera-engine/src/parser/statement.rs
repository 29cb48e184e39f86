//! Statement AST.
//!
//! The parser turns one source statement into exactly one `Statement`
//! variant, carrying the minimum state its execution needs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::executor::{Predicate, Value};
use crate::storage::Column;

/// One parsed statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `create table <name> (<coldefs>)`
    CreateTable(CreateTable),
    /// `insert (<assignments>) to <table>`
    Insert(Insert),
    /// `select <projection> from <table> [where <predicate>]`
    Select(Select),
    /// `update <table> set <assignments> [where <predicate>]`
    Update(Update),
    /// `delete <table> [where <predicate>]`
    Delete(Delete),
}

impl Statement {
    /// Returns the statement's keyword, for diagnostics.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "CREATE",
            Statement::Insert(_) => "INSERT",
            Statement::Select(_) => "SELECT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
        }
    }
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    /// Table name.
    pub name: String,
    /// Column descriptors in declaration order.
    pub columns: Vec<Column>,
}

/// A row insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    /// Target table.
    pub table: String,
    /// Column name to value assignments.
    pub values: HashMap<String, Value>,
}

/// A projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    /// Source table.
    pub table: String,
    /// Projected column names; empty selects every column.
    pub projection: Vec<String>,
    /// Row filter.
    pub predicate: Option<Predicate>,
}

/// An in-place update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Target table.
    pub table: String,
    /// Column name to new value assignments.
    pub assignments: HashMap<String, Value>,
    /// Row filter.
    pub predicate: Option<Predicate>,
}

/// A row deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    /// Target table.
    pub table: String,
    /// Row filter; absent matches every row.
    pub predicate: Option<Predicate>,
}
