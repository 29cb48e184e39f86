//! Runtime values for the query pipeline.
//!
//! This module defines the `Value` type held in record cells and the
//! `ValueKind` tag that pins which variant a column may legally store.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::error::{EvalError, EvalResult};

/// Column kind tag.
///
/// `None` is the reserved zero used as a sentinel in the dump format;
/// live columns always carry one of the other kinds. `Id` is the reserved
/// auto-increment key kind; its cells hold the same integer payload as
/// `Integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Reserved sentinel, never attached to a live column.
    None,
    /// 32-bit signed integer.
    Integer,
    /// Reserved auto-increment integer key.
    Id,
    /// Boolean.
    Bool,
    /// Length-bounded text.
    String,
    /// Length-bounded byte sequence.
    Bytes,
}

impl ValueKind {
    /// Returns the kind string used by the dump format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValueKind::None => "None",
            ValueKind::Integer => "Integer",
            ValueKind::Id => "Id",
            ValueKind::Bool => "Bool",
            ValueKind::String => "String",
            ValueKind::Bytes => "Bytes",
        }
    }

    /// Parses a dump-format kind string.
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "None" => Some(ValueKind::None),
            "Integer" => Some(ValueKind::Integer),
            "Id" => Some(ValueKind::Id),
            "Bool" => Some(ValueKind::Bool),
            "String" => Some(ValueKind::String),
            "Bytes" => Some(ValueKind::Bytes),
            _ => None,
        }
    }

    /// Returns true for the integer-payload kinds.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Id)
    }

    /// Returns true for the kinds that require a maximum length.
    #[must_use]
    pub const fn is_sized(&self) -> bool {
        matches!(self, ValueKind::String | ValueKind::Bytes)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runtime value held in a record cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// 32-bit signed integer.
    Int(i32),
    /// Boolean.
    Bool(bool),
    /// Text.
    Str(String),
    /// Byte sequence.
    Bytes(Vec<u8>),
}

impl Value {
    /// Creates an integer value.
    pub fn int(v: i32) -> Self {
        Value::Int(v)
    }

    /// Creates a boolean value.
    pub fn boolean(v: bool) -> Self {
        Value::Bool(v)
    }

    /// Creates a string value.
    pub fn string(v: impl Into<String>) -> Self {
        Value::Str(v.into())
    }

    /// Creates a bytes value.
    pub fn bytes(v: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(v.into())
    }

    /// Returns the kind of this value's variant.
    ///
    /// Integer payloads report `Integer`; a cell belonging to an `Id`
    /// column carries the same variant, so `Id` and `Integer` map to the
    /// same runtime representation.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Integer,
            Value::Bool(_) => ValueKind::Bool,
            Value::Str(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
        }
    }

    /// Returns true if this value's variant is legal for a column of
    /// `kind`.
    #[must_use]
    pub const fn matches_kind(&self, kind: ValueKind) -> bool {
        match self {
            Value::Int(_) => kind.is_integer(),
            Value::Bool(_) => matches!(kind, ValueKind::Bool),
            Value::Str(_) => matches!(kind, ValueKind::String),
            Value::Bytes(_) => matches!(kind, ValueKind::Bytes),
        }
    }

    /// Returns the zero value for a column kind.
    #[must_use]
    pub fn zero_for(kind: ValueKind) -> Self {
        match kind {
            ValueKind::None | ValueKind::Integer | ValueKind::Id => Value::Int(0),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::String => Value::Str(String::new()),
            ValueKind::Bytes => Value::Bytes(Vec::new()),
        }
    }

    /// Returns the payload size in bytes.
    ///
    /// Fixed-width kinds report their width, sized kinds the current
    /// payload length.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Value::Int(_) => std::mem::size_of::<i32>(),
            Value::Bool(_) => std::mem::size_of::<bool>(),
            Value::Str(s) => s.len(),
            Value::Bytes(b) => b.len(),
        }
    }

    /// Compares two values of the same variant.
    ///
    /// Ordering is defined only within a variant; comparing across
    /// variants is a type error.
    pub fn try_cmp(&self, other: &Value) -> EvalResult<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Ok(a.cmp(b)),
            (a, b) => Err(EvalError::TypeMismatch {
                left: a.kind(),
                right: b.kind(),
            }),
        }
    }

    /// Variant rank used by the total order.
    const fn rank(&self) -> u8 {
        match self {
            Value::Int(_) => 0,
            Value::Bool(_) => 1,
            Value::Str(_) => 2,
            Value::Bytes(_) => 3,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.try_cmp(other), Ok(Ordering::Equal))
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order over values: variant rank first, payload second.
///
/// This order exists so values can key the ordered index maps; predicate
/// comparison goes through [`Value::try_cmp`], which rejects cross-variant
/// operands.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.try_cmp(other)
            .unwrap_or_else(|_| self.rank().cmp(&other.rank()))
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int(v) => v.hash(state),
            Value::Bool(v) => v.hash(state),
            Value::Str(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value the way views print cells: integers in decimal,
    /// booleans as `true`/`false`, strings raw, bytes as a raw byte run.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            Value::Str(s) => f.write_str(s),
            Value::Bytes(b) => {
                for byte in b {
                    write!(f, "{}", char::from(*byte))?;
                }
                Ok(())
            }
        }
    }
}
