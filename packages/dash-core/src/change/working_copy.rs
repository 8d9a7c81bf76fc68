//! Editable working copy paired with its immutable baseline.

use super::detector::diff;
use super::record::ChangeRecord;
use crate::error::DashError;
use crate::table::{validation, Table};
use crate::types::Value;

/// Holds the baseline snapshot and a separately editable working copy.
///
/// Edits are staged on the working copy only; the baseline is replaced
/// solely through [`WorkingCopy::rebase`] after a successful save.
#[derive(Debug, Clone)]
pub struct WorkingCopy {
    baseline: Table,
    working: Table,
    key_column: String,
    editable_columns: Vec<String>,
}

impl WorkingCopy {
    /// Creates a working copy identical to `baseline`.
    ///
    /// # Errors
    /// - `MissingKeyColumn` if the key column is absent
    /// - `InvalidColumn` if an editable column is absent
    /// - `ColumnNotEditable` if the key column is listed as editable
    pub fn new(
        baseline: Table,
        key_column: impl Into<String>,
        editable_columns: Vec<String>,
    ) -> Result<Self, DashError> {
        let key_column = key_column.into();
        Self::validate(&baseline, &key_column, &editable_columns)?;
        Ok(Self {
            working: baseline.clone(),
            baseline,
            key_column,
            editable_columns,
        })
    }

    fn validate(table: &Table, key_column: &str, editable: &[String]) -> Result<(), DashError> {
        if table.column_index(key_column).is_none() {
            return Err(DashError::MissingKeyColumn {
                table: table.name().to_string(),
                column: key_column.to_string(),
            });
        }
        for column in editable {
            if column == key_column {
                return Err(DashError::ColumnNotEditable {
                    column: column.clone(),
                });
            }
            table.require_column(column)?;
        }
        Ok(())
    }

    pub fn baseline(&self) -> &Table {
        &self.baseline
    }

    pub fn working(&self) -> &Table {
        &self.working
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn editable_columns(&self) -> &[String] {
        &self.editable_columns
    }

    pub fn is_editable(&self, column: &str) -> bool {
        self.editable_columns.iter().any(|c| c == column)
    }

    /// Stages a single cell edit on the working copy.
    ///
    /// # Returns
    /// The previous working value of the cell.
    pub fn stage_update(
        &mut self,
        row: usize,
        column: &str,
        value: Value,
    ) -> Result<Value, DashError> {
        if !self.is_editable(column) {
            return Err(DashError::ColumnNotEditable {
                column: column.to_string(),
            });
        }
        self.working.set_value(row, column, value)
    }

    /// Stages several edits on one row.
    ///
    /// Every update is checked before any is applied, so a rejected value
    /// leaves the row untouched.
    pub fn stage_updates(&mut self, row: usize, updates: &[(String, Value)]) -> Result<(), DashError> {
        if row >= self.working.row_count() {
            return Err(DashError::RowOutOfRange {
                table: self.working.name().to_string(),
                row,
                rows: self.working.row_count(),
            });
        }

        let mut admitted = Vec::with_capacity(updates.len());
        for (column, value) in updates {
            if !self.is_editable(column) {
                return Err(DashError::ColumnNotEditable {
                    column: column.clone(),
                });
            }
            let index = self.working.require_column(column)?;
            let value = validation::admit(&self.working.columns()[index], value.clone())?;
            admitted.push((column.as_str(), value));
        }

        for (column, value) in admitted {
            self.working.set_value(row, column, value)?;
        }
        Ok(())
    }

    /// Detects changed rows relative to the baseline.
    pub fn changes(&self) -> Result<Vec<ChangeRecord>, DashError> {
        diff(
            &self.baseline,
            &self.working,
            &self.key_column,
            &self.editable_columns,
        )
    }

    pub fn has_changes(&self) -> bool {
        self.working
            .rows()
            .zip(self.baseline.rows())
            .any(|(after, before)| after.iter().zip(before).any(|(a, b)| !a.same_as(b)))
    }

    /// Drops every staged edit.
    pub fn discard(&mut self) {
        self.working = self.baseline.clone();
    }

    /// Replaces the baseline with freshly loaded data and resets the working copy.
    pub fn rebase(&mut self, baseline: Table) -> Result<(), DashError> {
        Self::validate(&baseline, &self.key_column, &self.editable_columns)?;
        self.working = baseline.clone();
        self.baseline = baseline;
        Ok(())
    }

    /// Stages the changed columns of `records` again, matching rows by key.
    ///
    /// Used after a rebase to keep edits that were not written. A record
    /// whose key is gone, or whose values no longer fit the column, is
    /// skipped.
    ///
    /// # Returns
    /// The number of records staged again.
    pub fn restage(&mut self, records: &[ChangeRecord]) -> Result<usize, DashError> {
        let key_index = self.working.require_column(&self.key_column)?;
        let mut restaged = 0;

        for record in records {
            let at_position = self
                .working
                .row(record.row)
                .is_some_and(|row| row[key_index].same_as(&record.key));
            let row = if at_position {
                Some(record.row)
            } else {
                self.working
                    .rows()
                    .position(|row| row[key_index].same_as(&record.key))
            };
            let Some(row) = row else {
                tracing::warn!("Row with key {} is gone, dropping its edit", record.key);
                continue;
            };

            let updates: Vec<(String, Value)> = record
                .changed
                .iter()
                .filter_map(|column| record.get(column).map(|v| (column.clone(), v.clone())))
                .collect();
            match self.stage_updates(row, &updates) {
                Ok(()) => restaged += 1,
                Err(e) => tracing::warn!("Could not restage edit of {}: {}", record.key, e),
            }
        }

        Ok(restaged)
    }
}
