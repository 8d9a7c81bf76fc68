//! Load-time value coercion.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::column_type::ColumnType;
use super::value::Value;
use crate::table::Table;

/// Accepted timestamp layouts, tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Accepted date-only layouts; month-first for slashed dates.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a timestamp or date string. Offsets are normalized to UTC.
pub fn parse_temporal(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Converts text columns whose name contains `marker` (case-insensitive) to temporal.
///
/// Unparseable cells become null rather than failing the load. Columns that
/// are already temporal, or not textual, are left untouched.
pub fn coerce_date_columns(mut table: Table, marker: &str) -> Table {
    if marker.is_empty() {
        return table;
    }
    let marker = marker.to_lowercase();

    let targets: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.column_type == ColumnType::Text && c.name.to_lowercase().contains(&marker)
        })
        .map(|(idx, _)| idx)
        .collect();

    for idx in targets {
        let mut unparsed = 0usize;
        table.retype_column(idx, ColumnType::Temporal, |value| match value {
            Value::Text(s) => match parse_temporal(s) {
                Some(t) => Value::Temporal(t),
                None => {
                    unparsed += 1;
                    Value::Null
                }
            },
            _ => Value::Null,
        });
        if unparsed > 0 {
            tracing::warn!(
                "Column '{}': {} values could not be parsed as dates and were set to null",
                table.columns()[idx].name,
                unparsed
            );
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use chrono::Timelike;

    #[test]
    fn test_parse_temporal_layouts() {
        let date = parse_temporal("2024-05-06").unwrap();
        assert_eq!(date.to_string(), "2024-05-06 00:00:00");

        let ts = parse_temporal("2024-05-06 13:45:10").unwrap();
        assert_eq!(ts.hour(), 13);

        let utc = parse_temporal("2024-05-06T12:00:00+02:00").unwrap();
        assert_eq!(utc.hour(), 10);

        assert_eq!(
            parse_temporal("05/06/2024").unwrap().to_string(),
            "2024-05-06 00:00:00"
        );
        assert!(parse_temporal("not a date").is_none());
        assert!(parse_temporal("  ").is_none());
    }

    #[test]
    fn test_coerce_date_columns_sets_bad_values_to_null() {
        let table = Table::from_rows(
            "orders",
            vec![
                Column::new("ORDER_ID", ColumnType::Text),
                Column::new("ORDER_DATE", ColumnType::Text),
                Column::new("QTY", ColumnType::Integer),
            ],
            vec![
                vec!["A1".into(), "2024-01-05".into(), Value::Integer(1)],
                vec!["A2".into(), "garbage".into(), Value::Integer(2)],
                vec!["A3".into(), Value::Null, Value::Integer(3)],
            ],
        )
        .unwrap();

        let table = coerce_date_columns(table, "date");
        let idx = table.column_index("ORDER_DATE").unwrap();
        assert_eq!(table.columns()[idx].column_type, ColumnType::Temporal);
        assert!(matches!(table.value(0, "ORDER_DATE").unwrap(), Value::Temporal(_)));
        assert_eq!(table.value(1, "ORDER_DATE").unwrap(), &Value::Null);
        assert_eq!(table.value(2, "ORDER_DATE").unwrap(), &Value::Null);
        // untouched
        assert_eq!(table.value(0, "ORDER_ID").unwrap(), &Value::from("A1"));
    }
}
