//! Row selection and column access for table operations.

use super::Table;
use crate::types::Value;

impl Table {
    /// Returns a table holding the rows at `indices`, in the given order.
    ///
    /// Indices past the end are skipped. Filtering passes ascending indices,
    /// which makes the result a row-subsequence of `self`.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        let rows = indices
            .iter()
            .filter_map(|&idx| self.rows.get(idx).cloned())
            .collect();

        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Returns the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Iterates over the values of one column.
    ///
    /// Yields nothing for an invalid position; resolve names with
    /// [`Table::require_column`] first.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Names of integer and float columns, in declaration order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.column_type.is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }
}
