use serde::{Deserialize, Serialize};

/// The storage type of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// 64-bit integer, used for identifiers and foreign keys.
    BigInt,
    Integer,
    Text,
    Double,
    /// Arbitrary precision decimal for fees, prices and profit figures.
    Numeric,
    Boolean,
    Timestamp,
}

impl ColumnType {
    /// Returns the PostgreSQL type name for this column type.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::BigInt => "BIGINT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Numeric => "NUMERIC",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "TIMESTAMPTZ",
        }
    }

    /// The literal used as the `DEFAULT` of a non-nullable column so that it can be
    /// added to a table that already holds rows.
    pub fn default_literal(&self) -> &'static str {
        match self {
            ColumnType::BigInt | ColumnType::Integer | ColumnType::Double | ColumnType::Numeric => "0",
            ColumnType::Text => "''",
            ColumnType::Boolean => "FALSE",
            ColumnType::Timestamp => "now()",
        }
    }
}
