//! CSV import with per-column type inference.

use std::io::Read;

use crate::error::DashError;
use crate::table::{Column, Table};
use crate::types::{ColumnType, Value};

/// Type suggested by a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Empty,
    Boolean,
    Integer,
    Float,
    Text,
}

fn field_kind(field: &str) -> FieldKind {
    if field.is_empty() {
        FieldKind::Empty
    } else if field.eq_ignore_ascii_case("true") || field.eq_ignore_ascii_case("false") {
        FieldKind::Boolean
    } else if field.parse::<i64>().is_ok() {
        FieldKind::Integer
    } else if field.parse::<f64>().is_ok() {
        FieldKind::Float
    } else {
        FieldKind::Text
    }
}

/// Integer and float widen to float; any other mix is text.
fn merge(current: FieldKind, next: FieldKind) -> FieldKind {
    use FieldKind::*;
    match (current, next) {
        (kind, Empty) | (Empty, kind) => kind,
        (a, b) if a == b => a,
        (Integer, Float) | (Float, Integer) => Float,
        _ => Text,
    }
}

fn column_type(kind: FieldKind) -> ColumnType {
    match kind {
        FieldKind::Boolean => ColumnType::Boolean,
        FieldKind::Integer => ColumnType::Integer,
        FieldKind::Float => ColumnType::Float,
        FieldKind::Empty | FieldKind::Text => ColumnType::Text,
    }
}

fn parse_field(field: &str, column_type: ColumnType) -> Result<Value, DashError> {
    if field.is_empty() {
        return Ok(Value::Null);
    }
    let mismatch = || DashError::TypeMismatch {
        expected: column_type.to_string(),
        got: field.to_string(),
    };
    match column_type {
        ColumnType::Boolean => Ok(Value::Boolean(field.eq_ignore_ascii_case("true"))),
        ColumnType::Integer => field.parse().map(Value::Integer).map_err(|_| mismatch()),
        ColumnType::Float => field.parse().map(Value::Float).map_err(|_| mismatch()),
        ColumnType::Text | ColumnType::Temporal => Ok(Value::Text(field.to_string())),
    }
}

/// Reads a headed CSV document into a table named `name`.
///
/// Empty fields are nulls. Date-like text stays text; the load path turns
/// date-named columns into timestamps.
pub fn read_csv<R: Read>(name: &str, reader: R) -> Result<Table, DashError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let records = csv_reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error)?;

    let mut kinds = vec![FieldKind::Empty; headers.len()];
    for record in &records {
        if record.len() != headers.len() {
            return Err(DashError::RowWidthMismatch {
                table: name.to_string(),
                expected: headers.len(),
                got: record.len(),
            });
        }
        for (kind, field) in kinds.iter_mut().zip(record.iter()) {
            *kind = merge(*kind, field_kind(field));
        }
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(&kinds)
        .map(|(header, kind)| Column::new(header, column_type(*kind)))
        .collect();

    let mut table = Table::create(name, columns)?;
    for record in &records {
        let row = record
            .iter()
            .zip(&kinds)
            .map(|(field, kind)| parse_field(field, column_type(*kind)))
            .collect::<Result<Vec<_>, _>>()?;
        table.push_row(row)?;
    }

    tracing::debug!(
        "Read {} rows x {} columns from CSV into '{}'",
        table.row_count(),
        table.column_count(),
        name
    );
    Ok(table)
}

fn csv_error(error: csv::Error) -> DashError {
    DashError::SerializationError(format!("Failed to read CSV: {}", error))
}
