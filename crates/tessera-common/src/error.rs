//! Unified error type for TesseraDB.
//!
//! The engine's internal layers (lexer, parser, storage, executor) carry
//! their own error enums; they convert into [`TesseraError`] at the call
//! boundary so embedders handle a single type.

use std::fmt;

use thiserror::Error;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and are stable
/// across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Internal error (bug).
    Internal = 0x0001,

    // Language errors (0x0100 - 0x01FF)
    /// Lexical error in a statement.
    LexError = 0x0100,
    /// Syntax error in a statement.
    ParseError = 0x0101,

    // Schema errors (0x0200 - 0x02FF)
    /// Column unknown or schema rule violated.
    SchemaError = 0x0200,
    /// Unique or auto-increment constraint violated.
    ConstraintError = 0x0201,

    // Evaluation errors (0x0300 - 0x03FF)
    /// Operand types incompatible with an operation.
    TypeError = 0x0300,

    // I/O errors (0x0400 - 0x04FF)
    /// Dump file unreadable or malformed.
    IoError = 0x0400,

    // Catalog errors (0x0500 - 0x05FF)
    /// Table not found in the catalog.
    NotFound = 0x0500,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Language",
            0x02 => "Schema",
            0x03 => "Evaluation",
            0x04 => "I/O",
            0x05 => "Catalog",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The unified error type for TesseraDB.
///
/// Each variant corresponds to one behavioral error kind; the payload is a
/// human-readable message assembled by the failing layer.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// Lexical error: unterminated string, unexpected character.
    #[error("lex error: {0}")]
    Lex(String),

    /// Syntax error: wrong token type, unknown command head.
    #[error("parse error: {0}")]
    Parse(String),

    /// Schema violation: unknown column, attribute conflict, bad length.
    #[error("schema error: {0}")]
    Schema(String),

    /// Constraint violation: duplicate unique value, auto-increment write.
    #[error("constraint error: {0}")]
    Constraint(String),

    /// Type error: mismatched variants, unsupported operator.
    #[error("type error: {0}")]
    Type(String),

    /// I/O or dump-format failure.
    #[error("io error: {0}")]
    Io(String),

    /// Unknown table.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal invariant breakage (a bug).
    #[error("internal error: {0}")]
    Internal(String),
}

impl TesseraError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            TesseraError::Lex(_) => ErrorCode::LexError,
            TesseraError::Parse(_) => ErrorCode::ParseError,
            TesseraError::Schema(_) => ErrorCode::SchemaError,
            TesseraError::Constraint(_) => ErrorCode::ConstraintError,
            TesseraError::Type(_) => ErrorCode::TypeError,
            TesseraError::Io(_) => ErrorCode::IoError,
            TesseraError::NotFound(_) => ErrorCode::NotFound,
            TesseraError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<std::io::Error> for TesseraError {
    fn from(e: std::io::Error) -> Self {
        TesseraError::Io(e.to_string())
    }
}

/// Result type alias for TesseraDB operations.
pub type TesseraResult<T> = std::result::Result<T, TesseraError>;
