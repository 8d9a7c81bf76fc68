//! Column definition within a table.

use serde::{Deserialize, Serialize};

use crate::types::ColumnType;

/// Column definition within a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,
    /// Declared semantic type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    /// Creates a new column definition.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}
