//! Semantic column types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashError;

/// Declared semantic type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
    /// true/false flag
    Boolean,
    /// UTF-8 text, also used for categorical data
    Text,
    /// Timestamp without time zone; dates are stored at midnight
    Temporal,
}

impl ColumnType {
    /// Returns true for integer and float columns.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Returns true if ordering operators are defined for this type.
    pub fn is_orderable(self) -> bool {
        self.is_numeric() || self == ColumnType::Temporal
    }

    /// Canonical type name used in schemas and error messages.
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
            ColumnType::Temporal => "temporal",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnType {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "integer" | "int" | "i64" => Ok(ColumnType::Integer),
            "float" | "f64" | "number" => Ok(ColumnType::Float),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "text" | "string" => Ok(ColumnType::Text),
            "temporal" | "timestamp" | "date" | "datetime" => Ok(ColumnType::Temporal),
            other => Err(DashError::TypeMismatch {
                expected: "column type name".to_string(),
                got: other.to_string(),
            }),
        }
    }
}
