//! Evaluation error types.

use thiserror::Error;

use super::value::ValueKind;

/// Errors raised while evaluating expressions or predicates.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Comparison or arithmetic across mismatched value variants.
    #[error("cannot compare {left} with {right}")]
    TypeMismatch {
        /// Kind of the left operand.
        left: ValueKind,
        /// Kind of the right operand.
        right: ValueKind,
    },

    /// Operator not defined for the operand types.
    #[error("unsupported operator '{operator}' for {operand} operand")]
    UnsupportedOperator {
        /// The operator lexeme.
        operator: String,
        /// Kind of the offending operand.
        operand: ValueKind,
    },

    /// Integer division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A predicate referenced a column the table does not have.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

impl From<EvalError> for tessera_common::TesseraError {
    fn from(e: EvalError) -> Self {
        match e {
            EvalError::UnknownColumn(_) => tessera_common::TesseraError::Schema(e.to_string()),
            other => tessera_common::TesseraError::Type(other.to_string()),
        }
    }
}
