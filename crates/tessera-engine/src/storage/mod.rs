//! Columns, tables, the catalog, and text persistence.

mod catalog;
mod column;
mod dump;
mod error;
mod table;

pub use catalog::Catalog;
pub use column::{Column, ColumnFlags};
pub use dump::{dump_table, escape_csv_field, load_table, parse_csv_line};
pub use error::{StorageError, StorageResult};
pub use table::Table;
