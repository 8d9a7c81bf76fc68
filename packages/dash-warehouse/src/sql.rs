//! Statement builders.
//!
//! Identifiers are always quoted; values never appear in SQL text and are
//! carried alongside as positional parameters.

use dash_core::change::{ChangeRecord, FieldValue};
use dash_core::types::Value;

/// Quotes an identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"schema"."table"`, or just `"table"` when the schema is empty.
pub fn qualified_name(schema: &str, table: &str) -> String {
    if schema.is_empty() {
        quote_identifier(table)
    } else {
        format!("{}.{}", quote_identifier(schema), quote_identifier(table))
    }
}

/// Full-table read.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub schema: String,
    pub table: String,
}

impl SelectQuery {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    pub fn to_sql(&self) -> String {
        format!("SELECT * FROM {}", qualified_name(&self.schema, &self.table))
    }

    /// Explicit select list; `as_text` columns are read through a `::text` cast
    /// under their own name.
    pub fn to_sql_with_columns(&self, columns: &[SelectColumn]) -> String {
        let list = columns
            .iter()
            .map(|column| {
                let name = quote_identifier(&column.name);
                if column.as_text {
                    format!("{}::text AS {}", name, name)
                } else {
                    name
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!("SELECT {} FROM {}", list, qualified_name(&self.schema, &self.table))
    }
}

/// One entry of an explicit select list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub name: String,
    pub as_text: bool,
}

/// Parameterized single-row update addressed by key.
///
/// Parameters are the assignment values in order, followed by the key.
#[derive(Debug, Clone, PartialEq)]
pub struct PointUpdate {
    pub schema: String,
    pub table: String,
    pub key_column: String,
    pub key: Value,
    pub assignments: Vec<FieldValue>,
}

impl PointUpdate {
    pub fn from_record(
        schema: impl Into<String>,
        table: impl Into<String>,
        key_column: impl Into<String>,
        record: &ChangeRecord,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            key_column: key_column.into(),
            key: record.key.clone(),
            assignments: record.values.clone(),
        }
    }

    /// `UPDATE "s"."t" SET "a" = $1, "b" = $2 WHERE "k" = $3`
    pub fn to_sql(&self) -> String {
        self.render(false)
    }

    /// Like [`PointUpdate::to_sql`], comparing the key as text:
    /// `WHERE "k"::text = $3`. Matches keys of any type read as text.
    pub fn to_sql_text_key(&self) -> String {
        self.render(true)
    }

    fn render(&self, text_key: bool) -> String {
        let set_clause = self
            .assignments
            .iter()
            .enumerate()
            .map(|(idx, field)| format!("{} = ${}", quote_identifier(&field.column), idx + 1))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "UPDATE {} SET {} WHERE {}{} = ${}",
            qualified_name(&self.schema, &self.table),
            set_clause,
            quote_identifier(&self.key_column),
            if text_key { "::text" } else { "" },
            self.assignments.len() + 1
        )
    }

    /// Parameter values in placeholder order.
    pub fn parameters(&self) -> Vec<&Value> {
        self.assignments
            .iter()
            .map(|field| &field.value)
            .chain(std::iter::once(&self.key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::types::ColumnType;

    fn record() -> ChangeRecord {
        ChangeRecord {
            row: 0,
            key: Value::from("A1"),
            values: vec![
                FieldValue {
                    column: "QTY".to_string(),
                    column_type: ColumnType::Integer,
                    value: Value::Integer(7),
                },
                FieldValue {
                    column: "RETURNED_FL".to_string(),
                    column_type: ColumnType::Boolean,
                    value: Value::Boolean(false),
                },
            ],
            changed: vec!["QTY".to_string()],
        }
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("QTY"), "\"QTY\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_select_query() {
        assert_eq!(
            SelectQuery::new("public", "CSV_FASTSHIP_ORDERS").to_sql(),
            "SELECT * FROM \"public\".\"CSV_FASTSHIP_ORDERS\""
        );
        assert_eq!(SelectQuery::new("", "orders").to_sql(), "SELECT * FROM \"orders\"");
    }

    #[test]
    fn test_point_update_sql_and_parameters() {
        let update = PointUpdate::from_record("public", "orders", "ORDER_ID", &record());

        assert_eq!(
            update.to_sql(),
            "UPDATE \"public\".\"orders\" SET \"QTY\" = $1, \"RETURNED_FL\" = $2 WHERE \"ORDER_ID\" = $3"
        );
        assert_eq!(
            update.parameters(),
            vec![&Value::Integer(7), &Value::Boolean(false), &Value::from("A1")]
        );
    }

    #[test]
    fn test_select_with_text_casts() {
        let columns = vec![
            SelectColumn {
                name: "ORDER_UUID".to_string(),
                as_text: true,
            },
            SelectColumn {
                name: "QTY".to_string(),
                as_text: false,
            },
        ];

        assert_eq!(
            SelectQuery::new("public", "orders").to_sql_with_columns(&columns),
            "SELECT \"ORDER_UUID\"::text AS \"ORDER_UUID\", \"QTY\" FROM \"public\".\"orders\""
        );
    }

    #[test]
    fn test_point_update_with_text_key() {
        let update = PointUpdate::from_record("public", "orders", "ORDER_UUID", &record());

        assert_eq!(
            update.to_sql_text_key(),
            "UPDATE \"public\".\"orders\" SET \"QTY\" = $1, \"RETURNED_FL\" = $2 WHERE \"ORDER_UUID\"::text = $3"
        );
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let mut record = record();
        record.key = Value::from("x'; DROP TABLE orders; --");
        let update = PointUpdate::from_record("public", "orders", "ORDER_ID", &record);

        assert!(!update.to_sql().contains("DROP"));
    }
}
