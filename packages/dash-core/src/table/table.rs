//! Table schema and row storage.
//!
//! Each table has:
//! - Ordered columns with unique names and declared types
//! - Rows indexed 0..N-1 for the lifetime of one load
//! - Values always admitted by their column's type (or null)

use crate::error::DashError;
use crate::types::{ColumnType, Value};

use super::column::Column;
use super::validation;

/// Rectangular table with named, typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name
    pub(super) name: String,
    /// Column definitions in declaration order
    pub(super) columns: Vec<Column>,
    /// Row values, one entry per column
    pub(super) rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    ///
    /// # Arguments
    /// * `name` - Table name
    /// * `columns` - Column definitions
    ///
    /// # Returns
    /// `Result<Table, DashError>` containing the created table or an error.
    pub fn create(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, DashError> {
        let name = name.into();
        validation::validate_unique_columns(&name, &columns)?;
        Ok(Self {
            name,
            columns,
            rows: Vec::new(),
        })
    }

    /// Creates a table and appends every row, validating each one.
    pub fn from_rows(
        name: impl Into<String>,
        columns: Vec<Column>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, DashError> {
        let mut table = Self::create(name, columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Appends a row.
    ///
    /// # Errors
    /// `RowWidthMismatch` if the row width differs from the column count,
    /// `TypeMismatch` if a value is not admitted by its column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), DashError> {
        let row = validation::validate_row(&self.name, &self.columns, row)?;
        self.rows.push(row);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns a column definition by name, if present.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the position of a column or `InvalidColumn`.
    pub fn require_column(&self, name: &str) -> Result<usize, DashError> {
        self.column_index(name)
            .ok_or_else(|| DashError::InvalidColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Returns a row by position.
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Iterates over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Reads a single cell.
    pub fn value(&self, row: usize, column: &str) -> Result<&Value, DashError> {
        let col = self.require_column(column)?;
        self.check_row(row)?;
        Ok(&self.rows[row][col])
    }

    /// Overwrites a single cell, coercing the value to the column type.
    ///
    /// # Returns
    /// The previous value of the cell.
    pub fn set_value(&mut self, row: usize, column: &str, value: Value) -> Result<Value, DashError> {
        let col = self.require_column(column)?;
        self.check_row(row)?;
        let value = validation::admit(&self.columns[col], value)?;
        Ok(std::mem::replace(&mut self.rows[row][col], value))
    }

    /// Changes a column's declared type, rewriting every cell with `convert`.
    pub(crate) fn retype_column<F>(&mut self, index: usize, column_type: ColumnType, mut convert: F)
    where
        F: FnMut(&Value) -> Value,
    {
        self.columns[index].column_type = column_type;
        for row in &mut self.rows {
            let converted = convert(&row[index]);
            row[index] = converted;
        }
    }

    fn check_row(&self, row: usize) -> Result<(), DashError> {
        if row >= self.rows.len() {
            return Err(DashError::RowOutOfRange {
                table: self.name.clone(),
                row,
                rows: self.rows.len(),
            });
        }
        Ok(())
    }
}
