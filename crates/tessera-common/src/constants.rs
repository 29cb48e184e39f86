//! Engine-wide constants.

/// The name reserved for the implicit auto-increment key column.
pub const ID_COLUMN_NAME: &str = "id";

/// Section marker opening a table dump.
pub const DUMP_TABLE_MARKER: &str = "#TABLE_NAME";

/// Section marker introducing the column descriptors of a dump.
pub const DUMP_COLUMNS_MARKER: &str = "#COLUMNS";

/// Section marker introducing the data rows of a dump.
pub const DUMP_DATA_MARKER: &str = "#DATA";

/// Number of CSV fields in one serialized column descriptor line.
pub const COLUMN_LINE_FIELDS: usize = 9;
