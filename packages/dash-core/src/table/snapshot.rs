//! JSON snapshot format for tables.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::column::Column;
use super::Table;
use crate::error::DashError;
use crate::types::Value;

/// Serialized table: schema plus rows of JSON scalars.
///
/// ```json
/// {
///   "name": "CSV_FASTSHIP_ORDERS",
///   "columns": [{"name": "ORDER_ID", "type": "text"}, {"name": "QTY", "type": "integer"}],
///   "rows": [["A1", 5], ["A2", 7]]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Table name
    pub name: String,
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row values in column order
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl TryFrom<TableSnapshot> for Table {
    type Error = DashError;

    fn try_from(snapshot: TableSnapshot) -> Result<Self, Self::Error> {
        let mut table = Table::create(snapshot.name, snapshot.columns)?;
        for json_row in snapshot.rows {
            let row = json_row
                .iter()
                .map(Value::from_json)
                .collect::<Result<Vec<_>, _>>()?;
            table.push_row(row)?;
        }
        Ok(table)
    }
}

impl Table {
    /// Parses a table from its JSON snapshot form.
    pub fn from_json(json: &str) -> Result<Self, DashError> {
        let snapshot: TableSnapshot = serde_json::from_str(json)
            .map_err(|e| DashError::SerializationError(format!("Failed to parse table: {}", e)))?;
        Table::try_from(snapshot)
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Table", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &self.rows)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = TableSnapshot::deserialize(deserializer)?;
        Table::try_from(snapshot).map_err(serde::de::Error::custom)
    }
}
