//! Storage error types.

use thiserror::Error;

use crate::executor::ValueKind;

/// Storage error type.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Column name not present in the table.
    #[error("{table}: unknown column '{column}'")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Offending column name.
        column: String,
    },

    /// Two columns share a name.
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A column was declared with an empty name.
    #[error("column name must not be empty")]
    EmptyColumnName,

    /// String/Bytes column without a positive maximum length.
    #[error("column '{0}' requires a positive maximum length")]
    MissingLength(String),

    /// The declared default does not match the column kind.
    #[error("column '{column}': default value does not match kind {kind}")]
    DefaultKindMismatch {
        /// Column name.
        column: String,
        /// Declared kind.
        kind: ValueKind,
    },

    /// Auto-increment requested on a non-integer column.
    #[error("column '{0}': auto-increment requires an integer kind")]
    AutoIncrementKind(String),

    /// The reserved kind cannot be constructed directly.
    #[error("kind {0} is reserved")]
    ReservedKind(ValueKind),

    /// More values supplied than the table has columns.
    #[error("{table}: invalid amount of fields: {given}/{expected}")]
    TooManyValues {
        /// Table name.
        table: String,
        /// Number of supplied values.
        given: usize,
        /// Number of columns.
        expected: usize,
    },

    /// A value was supplied for an auto-increment column.
    #[error("{table}: auto-increment column '{column}' cannot be written")]
    AutoIncrementWrite {
        /// Table name.
        table: String,
        /// Offending column name.
        column: String,
    },

    /// A supplied value's variant does not match the column kind.
    #[error("{table}: column '{column}' expects {kind}")]
    ValueKindMismatch {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Expected kind.
        kind: ValueKind,
    },

    /// A string or bytes value exceeds the column's maximum length.
    #[error("{table}: value for column '{column}' exceeds maximum length {max_len}")]
    ValueTooLong {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Declared maximum length.
        max_len: usize,
    },

    /// Unique constraint violated.
    #[error("{table}: constraint unique field '{column}'")]
    UniqueViolation {
        /// Table name.
        table: String,
        /// Unique column whose value collided.
        column: String,
    },

    /// Table not present in the catalog.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Dump file violates the persistence format.
    #[error("dump format error: {0}")]
    Format(String),

    /// Underlying file I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Predicate evaluation failed while filtering records.
    #[error(transparent)]
    Eval(#[from] crate::executor::EvalError),
}

/// Storage result type.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for tessera_common::TesseraError {
    fn from(e: StorageError) -> Self {
        use tessera_common::TesseraError;
        match e {
            StorageError::UniqueViolation { .. } | StorageError::AutoIncrementWrite { .. } => {
                TesseraError::Constraint(e.to_string())
            }
            StorageError::TableNotFound(_) => TesseraError::NotFound(e.to_string()),
            StorageError::Format(_) | StorageError::Io(_) => TesseraError::Io(e.to_string()),
            StorageError::ValueKindMismatch { .. } => TesseraError::Type(e.to_string()),
            StorageError::Eval(inner) => inner.into(),
            _ => TesseraError::Schema(e.to_string()),
        }
    }
}
