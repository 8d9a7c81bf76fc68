//! Positional diff between a baseline and a working copy.

use super::record::{ChangeRecord, FieldValue};
use crate::error::DashError;
use crate::table::Table;

/// Returns one [`ChangeRecord`] per row whose editable columns differ.
///
/// Rows are matched by position only. Both tables must have the same row
/// count and the same key value at every position; inserting, deleting or
/// reordering rows between snapshots is rejected rather than guessed at.
/// Cells compare with [`Value::same_as`](crate::types::Value::same_as):
/// null equals null, NaN equals NaN, and only real value changes produce a
/// record.
///
/// # Errors
/// - `MissingKeyColumn` if `key_column` is absent from either table
/// - `InvalidColumn` if an editable column is absent from either table
/// - `RowCountMismatch` if the tables differ in length
/// - `RowKeyMismatch` if a key differs at some position
pub fn diff<S: AsRef<str>>(
    baseline: &Table,
    working: &Table,
    key_column: &str,
    editable_columns: &[S],
) -> Result<Vec<ChangeRecord>, DashError> {
    let key_index = |table: &Table| {
        table
            .column_index(key_column)
            .ok_or_else(|| DashError::MissingKeyColumn {
                table: table.name().to_string(),
                column: key_column.to_string(),
            })
    };
    let baseline_key = key_index(baseline)?;
    let working_key = key_index(working)?;

    let mut editable = Vec::with_capacity(editable_columns.len());
    for name in editable_columns {
        let name = name.as_ref();
        let b = baseline.require_column(name)?;
        let w = working.require_column(name)?;
        editable.push((name, b, w));
    }

    if baseline.row_count() != working.row_count() {
        return Err(DashError::RowCountMismatch {
            baseline: baseline.row_count(),
            working: working.row_count(),
        });
    }

    let mut records = Vec::new();
    for (row, (before, after)) in baseline.rows().zip(working.rows()).enumerate() {
        if !before[baseline_key].same_as(&after[working_key]) {
            return Err(DashError::RowKeyMismatch { row });
        }

        let changed: Vec<String> = editable
            .iter()
            .filter(|(_, b, w)| !before[*b].same_as(&after[*w]))
            .map(|(name, _, _)| name.to_string())
            .collect();

        if changed.is_empty() {
            continue;
        }

        let values = editable
            .iter()
            .map(|&(name, _, w)| FieldValue {
                column: name.to_string(),
                column_type: working.columns()[w].column_type,
                value: after[w].clone(),
            })
            .collect();

        records.push(ChangeRecord {
            row,
            key: before[baseline_key].clone(),
            values,
            changed,
        });
    }

    tracing::debug!(
        "Diffed '{}': {} changed rows out of {}",
        baseline.name(),
        records.len(),
        baseline.row_count()
    );

    Ok(records)
}
