//! Validation helpers for table schema and rows.

use std::collections::HashSet;

use super::column::Column;
use crate::error::DashError;
use crate::types::Value;

/// Validates that column names are unique.
pub(crate) fn validate_unique_columns(table: &str, columns: &[Column]) -> Result<(), DashError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(DashError::DuplicateColumn {
                table: table.to_string(),
                column: column.name.clone(),
            });
        }
    }
    Ok(())
}

/// Validates row width and coerces each value to its column type.
///
/// Integer input to a float column is widened; anything lossy is rejected.
pub(crate) fn validate_row(
    table: &str,
    columns: &[Column],
    row: Vec<Value>,
) -> Result<Vec<Value>, DashError> {
    if row.len() != columns.len() {
        return Err(DashError::RowWidthMismatch {
            table: table.to_string(),
            expected: columns.len(),
            got: row.len(),
        });
    }

    row.into_iter()
        .zip(columns)
        .map(|(value, column)| admit(column, value))
        .collect()
}

/// Admits a single value into a column without lossy conversion.
pub(crate) fn admit(column: &Column, value: Value) -> Result<Value, DashError> {
    match value.column_type() {
        None => Ok(value),
        Some(ty) if ty == column.column_type => Ok(value),
        _ => value
            .coerce_to(column.column_type)
            .map_err(|_| DashError::TypeMismatch {
                expected: format!("{} for column '{}'", column.column_type, column.name),
                got: format!("{} {}", value.type_name(), value),
            }),
    }
}
