//! Column descriptors.
//!
//! A column is immutable once attached to a table: name, kind, maximum
//! length for the sized kinds, an optional default, and the
//! unique/key/index/auto-increment flags. The reserved `id` column is
//! built only by [`Column::id`].

use serde::{Deserialize, Serialize};

use tessera_common::constants::ID_COLUMN_NAME;

use crate::executor::{Value, ValueKind};

use super::error::{StorageError, StorageResult};

/// Column behavior flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFlags {
    /// Values must be distinct across all records.
    pub unique: bool,
    /// Designated primary identifier; implies `unique`.
    pub key: bool,
    /// Maintain an ordered index over this column.
    pub index: bool,
    /// Values are assigned from a monotonic counter on insert.
    pub auto_increment: bool,
}

impl ColumnFlags {
    /// Flags with `unique` set.
    pub fn unique() -> Self {
        Self {
            unique: true,
            ..Self::default()
        }
    }

    /// Flags with `key` (and therefore `unique`) set.
    pub fn key() -> Self {
        Self {
            unique: true,
            key: true,
            ..Self::default()
        }
    }
}

/// Schema entry describing one table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    kind: ValueKind,
    max_len: usize,
    default: Option<Value>,
    flags: ColumnFlags,
}

impl Column {
    /// Creates a column descriptor, enforcing the schema invariants.
    ///
    /// `max_len` is required positive for `String`/`Bytes` and forced to
    /// zero otherwise. A default must match the declared kind. The `Id`
    /// and `None` kinds are reserved and rejected here.
    pub fn new(
        kind: ValueKind,
        name: impl Into<String>,
        max_len: usize,
        default: Option<Value>,
        mut flags: ColumnFlags,
    ) -> StorageResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StorageError::EmptyColumnName);
        }
        if matches!(kind, ValueKind::Id | ValueKind::None) {
            return Err(StorageError::ReservedKind(kind));
        }
        if kind.is_sized() && max_len == 0 {
            return Err(StorageError::MissingLength(name));
        }
        if flags.auto_increment && !kind.is_integer() {
            return Err(StorageError::AutoIncrementKind(name));
        }
        if let Some(ref value) = default {
            if !value.matches_kind(kind) {
                return Err(StorageError::DefaultKindMismatch { column: name, kind });
            }
        }
        if flags.key {
            flags.unique = true;
        }
        Ok(Self {
            name,
            kind,
            max_len: if kind.is_sized() { max_len } else { 0 },
            default,
            flags,
        })
    }

    /// Creates an integer column.
    pub fn integer(
        name: impl Into<String>,
        default: Option<i32>,
        flags: ColumnFlags,
    ) -> StorageResult<Self> {
        Self::new(ValueKind::Integer, name, 0, default.map(Value::Int), flags)
    }

    /// Creates a boolean column.
    pub fn boolean(
        name: impl Into<String>,
        default: Option<bool>,
        flags: ColumnFlags,
    ) -> StorageResult<Self> {
        Self::new(ValueKind::Bool, name, 0, default.map(Value::Bool), flags)
    }

    /// Creates a string column with the given maximum length.
    pub fn string(
        name: impl Into<String>,
        max_len: usize,
        default: Option<String>,
        flags: ColumnFlags,
    ) -> StorageResult<Self> {
        Self::new(ValueKind::String, name, max_len, default.map(Value::Str), flags)
    }

    /// Creates a bytes column with the given maximum length.
    pub fn bytes(
        name: impl Into<String>,
        max_len: usize,
        default: Option<Vec<u8>>,
        flags: ColumnFlags,
    ) -> StorageResult<Self> {
        Self::new(ValueKind::Bytes, name, max_len, default.map(Value::Bytes), flags)
    }

    /// The reserved pre-built `id` column: integer key, unique, indexed,
    /// auto-increment.
    pub fn id() -> Self {
        Self {
            name: ID_COLUMN_NAME.to_string(),
            kind: ValueKind::Id,
            max_len: 0,
            default: None,
            flags: ColumnFlags {
                unique: true,
                key: true,
                index: true,
                auto_increment: true,
            },
        }
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column kind.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns the kind tag stored in this column's cells.
    ///
    /// `Id` cells carry the plain integer tag.
    pub fn cell_kind(&self) -> ValueKind {
        if self.kind == ValueKind::Id {
            ValueKind::Integer
        } else {
            self.kind
        }
    }

    /// Returns the maximum payload length (zero for fixed-width kinds).
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Returns the declared default, if any.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns true if values must be distinct.
    pub fn is_unique(&self) -> bool {
        self.flags.unique
    }

    /// Returns true if this is the table's key column.
    pub fn is_key(&self) -> bool {
        self.flags.key
    }

    /// Returns true if an ordered index is maintained over this column.
    pub fn is_index(&self) -> bool {
        self.flags.index
    }

    /// Returns true if values are assigned from a counter on insert.
    pub fn is_auto_increment(&self) -> bool {
        self.flags.auto_increment
    }

    /// Checks a concrete value against this column's kind and length
    /// bound.
    pub fn check_value(&self, table: &str, value: &Value) -> StorageResult<()> {
        if !value.matches_kind(self.kind) {
            return Err(StorageError::ValueKindMismatch {
                table: table.to_string(),
                column: self.name.clone(),
                kind: self.kind,
            });
        }
        if self.kind.is_sized() && value.size() > self.max_len {
            return Err(StorageError::ValueTooLong {
                table: table.to_string(),
                column: self.name.clone(),
                max_len: self.max_len,
            });
        }
        Ok(())
    }

    /// Rebuilds a column from its dump representation.
    ///
    /// Used only by the persistence layer, which has already validated
    /// the kind string; the `Id` kind is accepted here because the dump
    /// may legitimately contain the reserved column.
    pub(crate) fn from_parts(
        kind: ValueKind,
        name: String,
        max_len: usize,
        default: Option<Value>,
        flags: ColumnFlags,
    ) -> StorageResult<Self> {
        if kind == ValueKind::Id {
            return Ok(Self::id());
        }
        Self::new(kind, name, max_len, default, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_column() {
        let col = Column::integer("age", None, ColumnFlags::default()).unwrap();
        assert_eq!(col.name(), "age");
        assert_eq!(col.kind(), ValueKind::Integer);
        assert_eq!(col.max_len(), 0);
        assert!(!col.is_unique());
    }

    #[test]
    fn test_key_implies_unique() {
        let col = Column::integer("n", None, ColumnFlags::key()).unwrap();
        assert!(col.is_key());
        assert!(col.is_unique());
    }

    #[test]
    fn test_string_requires_length() {
        let err = Column::string("login", 0, None, ColumnFlags::default()).unwrap_err();
        assert!(matches!(err, StorageError::MissingLength(_)));

        let col = Column::string("login", 32, None, ColumnFlags::default()).unwrap();
        assert_eq!(col.max_len(), 32);
    }

    #[test]
    fn test_bytes_requires_length() {
        let err = Column::bytes("hash", 0, None, ColumnFlags::default()).unwrap_err();
        assert!(matches!(err, StorageError::MissingLength(_)));
    }

    #[test]
    fn test_default_kind_mismatch() {
        let err = Column::new(
            ValueKind::Integer,
            "n",
            0,
            Some(Value::string("oops")),
            ColumnFlags::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::DefaultKindMismatch { .. }));
    }

    #[test]
    fn test_auto_increment_requires_integer() {
        let flags = ColumnFlags {
            auto_increment: true,
            ..ColumnFlags::default()
        };
        let err = Column::boolean("flag", None, flags).unwrap_err();
        assert!(matches!(err, StorageError::AutoIncrementKind(_)));
    }

    #[test]
    fn test_reserved_kinds_rejected() {
        let err = Column::new(ValueKind::Id, "id", 0, None, ColumnFlags::default()).unwrap_err();
        assert!(matches!(err, StorageError::ReservedKind(ValueKind::Id)));

        let err = Column::new(ValueKind::None, "x", 0, None, ColumnFlags::default()).unwrap_err();
        assert!(matches!(err, StorageError::ReservedKind(ValueKind::None)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = Column::integer("", None, ColumnFlags::default()).unwrap_err();
        assert!(matches!(err, StorageError::EmptyColumnName));
    }

    #[test]
    fn test_id_factory() {
        let id = Column::id();
        assert_eq!(id.name(), "id");
        assert_eq!(id.kind(), ValueKind::Id);
        assert_eq!(id.cell_kind(), ValueKind::Integer);
        assert!(id.is_key());
        assert!(id.is_unique());
        assert!(id.is_index());
        assert!(id.is_auto_increment());
        assert!(id.default().is_none());
    }

    #[test]
    fn test_check_value() {
        let col = Column::string("login", 4, None, ColumnFlags::default()).unwrap();
        assert!(col.check_value("users", &Value::string("abcd")).is_ok());
        assert!(matches!(
            col.check_value("users", &Value::string("abcde")),
            Err(StorageError::ValueTooLong { .. })
        ));
        assert!(matches!(
            col.check_value("users", &Value::int(1)),
            Err(StorageError::ValueKindMismatch { .. })
        ));
    }
}
