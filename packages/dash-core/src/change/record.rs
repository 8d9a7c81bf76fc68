/// Represents one changed row of the working copy.
///
/// `values` always carries the complete editable-column set, in editable
/// column order, so every point-update built from it has the same shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChangeRecord {
    /// Row position in both snapshots
    pub row: usize,
    /// Key column value taken from the baseline
    pub key: crate::types::Value,
    /// New values of every editable column
    pub values: Vec<FieldValue>,
    /// Editable columns whose value actually differs
    pub changed: Vec<String>,
}

impl ChangeRecord {
    /// Returns the new value of an editable column.
    pub fn get(&self, column: &str) -> Option<&crate::types::Value> {
        self.values
            .iter()
            .find(|field| field.column == column)
            .map(|field| &field.value)
    }
}

/// New value of a single editable column.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldValue {
    /// Column name
    pub column: String,
    /// Declared column type, needed to bind typed nulls
    #[serde(rename = "type")]
    pub column_type: crate::types::ColumnType,
    /// New value
    pub value: crate::types::Value,
}
