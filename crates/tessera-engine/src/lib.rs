//! # tessera-engine
//!
//! The TesseraDB query pipeline and table storage.
//!
//! This crate implements:
//! - Lexing and parsing of the Tessera statement language
//! - Typed columns, records, and in-memory tables with ordered indexes
//! - Predicate evaluation for select/update/delete
//! - Text persistence (dump/restore of whole tables)
//!
//! # Usage
//!
//! ```
//! use tessera_engine::Engine;
//!
//! let engine = Engine::new();
//! engine.execute("create table users ({unique} login: string[32], age: int32)").unwrap();
//! engine.execute("insert (login = \"alice\", age = 30) to users").unwrap();
//! let view = engine.execute("select * from users where age > 20").unwrap().unwrap();
//! assert_eq!(view.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Statement lexer and parser
pub mod parser;

/// Runtime values, records, predicates, and statement execution
pub mod executor;

/// Columns, tables, catalog, and persistence
pub mod storage;

pub use executor::{Engine, Predicate, Record, Value, ValueKind, View};
pub use parser::{Parser, Statement};
pub use storage::{Catalog, Column, Table};
