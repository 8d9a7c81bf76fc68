//! CSV export of a table.

use std::io::Write;

use chrono::NaiveDateTime;

use crate::error::DashError;
use crate::table::Table;
use crate::types::{ColumnType, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes `table` as CSV with a header row and no index column.
///
/// Nulls become empty fields. A temporal column is written date-only when
/// every value in it falls on midnight.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), DashError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(table.column_names())
        .map_err(csv_error)?;

    let formats: Vec<&str> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| match column.column_type {
            ColumnType::Temporal if !table.column_values(idx).all(date_only) => DATETIME_FORMAT,
            _ => DATE_FORMAT,
        })
        .collect();

    for row in table.rows() {
        let record = row
            .iter()
            .zip(&formats)
            .map(|(value, format)| format_field(value, format));
        csv_writer.write_record(record).map_err(csv_error)?;
    }

    csv_writer
        .flush()
        .map_err(|e| DashError::IoError(e.to_string()))
}

/// Renders `table` as a CSV string.
pub fn to_csv(table: &Table) -> Result<String, DashError> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| DashError::SerializationError(e.to_string()))
}

fn date_only(value: &Value) -> bool {
    value.is_null() || value.is_midnight()
}

fn format_field(value: &Value, temporal_format: &str) -> String {
    match value {
        Value::Null => String::new(),
        Value::Temporal(t) => format_temporal(t, temporal_format),
        other => other.to_string(),
    }
}

fn format_temporal(value: &NaiveDateTime, format: &str) -> String {
    value.format(format).to_string()
}

fn csv_error(error: csv::Error) -> DashError {
    DashError::SerializationError(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use ntest::timeout;

    fn orders(second_date: &str) -> Table {
        Table::from_rows(
            "orders",
            vec![
                Column::new("ORDER_ID", ColumnType::Text),
                Column::new("QTY", ColumnType::Integer),
                Column::new("PRICE", ColumnType::Float),
                Column::new("ORDER_DATE", ColumnType::Temporal),
            ],
            vec![
                vec!["A1".into(), 5.into(), 2.0.into(), "2024-01-01".into()],
                vec!["A,2".into(), Value::Null, 9.25.into(), second_date.into()],
            ],
        )
        .unwrap()
    }

    #[timeout(1000)]
    #[test]
    fn test_csv_has_header_and_one_line_per_row() {
        let csv = to_csv(&orders("2024-02-01")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines,
            vec![
                "ORDER_ID,QTY,PRICE,ORDER_DATE",
                "A1,5,2.0,2024-01-01",
                "\"A,2\",,9.25,2024-02-01",
            ]
        );
    }

    #[timeout(1000)]
    #[test]
    fn test_csv_keeps_time_when_present() {
        let csv = to_csv(&orders("2024-02-01 08:30:00")).unwrap();
        assert!(csv.contains("2024-01-01 00:00:00"));
        assert!(csv.contains("2024-02-01 08:30:00"));
    }

    #[timeout(1000)]
    #[test]
    fn test_empty_table_writes_header_only() {
        let table = orders("2024-02-01").head(0);
        assert_eq!(to_csv(&table).unwrap(), "ORDER_ID,QTY,PRICE,ORDER_DATE\n");
    }
}
