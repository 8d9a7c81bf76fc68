//! Predicate filter engine.
//!
//! A [`FilterSet`] is validated against the table schema in predicate order
//! before any row is evaluated, so an invalid predicate never yields a
//! partially filtered table.

mod operator;
mod predicate;

pub use operator::Operator;
pub use predicate::{FilterSet, Predicate, PredicateSpec};

use crate::error::DashError;
use crate::table::Table;
use crate::types::{ColumnType, Value};

/// A predicate bound to a column position with its operand coerced.
#[derive(Debug)]
struct ResolvedPredicate {
    column: usize,
    operator: Operator,
    operand: Value,
}

impl ResolvedPredicate {
    fn matches(&self, row: &[Value]) -> bool {
        row.get(self.column)
            .and_then(|cell| cell.compare(&self.operand))
            .map(|ordering| self.operator.evaluate(ordering))
            .unwrap_or(false)
    }
}

/// Returns the positions of rows satisfying every predicate, ascending.
///
/// # Errors
/// - `InvalidColumn` if a predicate names a column absent from `table`
/// - `TypeMismatch` if an ordering operator targets a text or boolean
///   column, or the value cannot be coerced to the column's type
pub fn matching_rows(table: &Table, filters: &FilterSet) -> Result<Vec<usize>, DashError> {
    let resolved = filters
        .iter()
        .map(|predicate| resolve(table, predicate))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(table
        .rows()
        .enumerate()
        .filter(|(_, row)| resolved.iter().all(|p| p.matches(row)))
        .map(|(idx, _)| idx)
        .collect())
}

/// Applies a filter set, returning the matching rows in their original order.
///
/// An empty filter set returns the table unchanged.
pub fn apply(table: &Table, filters: &FilterSet) -> Result<Table, DashError> {
    if filters.is_empty() {
        return Ok(table.clone());
    }
    let indices = matching_rows(table, filters)?;
    tracing::debug!(
        "Filtered '{}' with {} predicates: {} of {} rows",
        table.name(),
        filters.len(),
        indices.len(),
        table.row_count()
    );
    Ok(table.select_rows(&indices))
}

fn resolve(table: &Table, predicate: &Predicate) -> Result<ResolvedPredicate, DashError> {
    let index = table.require_column(&predicate.column)?;
    let column = &table.columns()[index];

    if predicate.operator.is_ordering() && !column.column_type.is_orderable() {
        return Err(DashError::TypeMismatch {
            expected: format!(
                "numeric or temporal column for operator '{}'",
                predicate.operator
            ),
            got: format!("{} column '{}'", column.column_type, column.name),
        });
    }

    let operand = coerce_operand(&predicate.value, column.column_type).map_err(|_| {
        DashError::TypeMismatch {
            expected: format!("{} value for column '{}'", column.column_type, column.name),
            got: format!("{} {}", predicate.value.type_name(), predicate.value),
        }
    })?;

    Ok(ResolvedPredicate {
        column: index,
        operator: predicate.operator,
        operand,
    })
}

/// Numeric columns accept any number, so `QTY > 10.5` works on an integer
/// column; every other type goes through regular coercion.
fn coerce_operand(value: &Value, column_type: ColumnType) -> Result<Value, DashError> {
    match (column_type.is_numeric(), value) {
        (_, Value::Null) => Err(DashError::TypeMismatch {
            expected: column_type.name().to_string(),
            got: "null".to_string(),
        }),
        (true, Value::Integer(_) | Value::Float(_)) => Ok(value.clone()),
        (true, Value::Text(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::Integer)
                .or_else(|_| s.parse::<f64>().map(Value::Float))
                .map_err(|_| DashError::TypeMismatch {
                    expected: column_type.name().to_string(),
                    got: s.to_string(),
                })
        }
        _ => value.coerce_to(column_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use chrono::NaiveDate;
    use ntest::timeout;

    fn orders() -> Table {
        Table::from_rows(
            "orders",
            vec![
                Column::new("ORDER_ID", ColumnType::Text),
                Column::new("QTY", ColumnType::Integer),
                Column::new("RETURNED_FL", ColumnType::Boolean),
                Column::new("ORDER_DATE", ColumnType::Temporal),
            ],
            vec![
                vec!["A1".into(), 5.into(), false.into(), "2024-01-01".into()],
                vec!["A2".into(), 15.into(), true.into(), "2024-02-01".into()],
                vec!["A3".into(), 20.into(), true.into(), "2024-03-01".into()],
                vec!["A4".into(), Value::Null, true.into(), Value::Null],
            ],
        )
        .unwrap()
    }

    #[timeout(1000)]
    #[test]
    fn test_empty_filter_set_is_identity() {
        let table = orders();
        assert_eq!(apply(&table, &FilterSet::new()).unwrap(), table);
    }

    #[timeout(1000)]
    #[test]
    fn test_conjunction_of_predicates() {
        let table = orders();
        let filters = FilterSet::new()
            .with(Predicate::new("QTY", Operator::Gt, 10))
            .with(Predicate::new("RETURNED_FL", Operator::Eq, true));

        let filtered = apply(&table, &filters).unwrap();
        let ids: Vec<&Value> = filtered.column_values(0).collect();
        assert_eq!(ids, vec![&Value::from("A2"), &Value::from("A3")]);
    }

    #[timeout(1000)]
    #[test]
    fn test_each_operator() {
        let table = orders();
        let count = |op: Operator| {
            let filters = FilterSet::new().with(Predicate::new("QTY", op, 15));
            matching_rows(&table, &filters).unwrap()
        };

        assert_eq!(count(Operator::Eq), vec![1]);
        assert_eq!(count(Operator::Gt), vec![2]);
        assert_eq!(count(Operator::Ge), vec![1, 2]);
        assert_eq!(count(Operator::Lt), vec![0]);
        assert_eq!(count(Operator::Le), vec![0, 1]);
    }

    #[timeout(1000)]
    #[test]
    fn test_null_cells_never_match() {
        let table = orders();
        let filters = FilterSet::new().with(Predicate::new("QTY", Operator::Ge, 0));
        assert_eq!(matching_rows(&table, &filters).unwrap(), vec![0, 1, 2]);
    }

    #[timeout(1000)]
    #[test]
    fn test_fractional_value_on_integer_column() {
        let table = orders();
        let filters = FilterSet::new().with(Predicate::new("QTY", Operator::Gt, 14.5));
        assert_eq!(matching_rows(&table, &filters).unwrap(), vec![1, 2]);
    }

    #[timeout(1000)]
    #[test]
    fn test_temporal_comparison_from_date_string() {
        let table = orders();
        let filters =
            FilterSet::new().with(Predicate::new("ORDER_DATE", Operator::Ge, "2024-02-01"));
        assert_eq!(matching_rows(&table, &filters).unwrap(), vec![1, 2]);

        let cutoff = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let filters = FilterSet::new().with(Predicate::new("ORDER_DATE", Operator::Lt, cutoff));
        assert_eq!(matching_rows(&table, &filters).unwrap(), vec![0]);
    }

    #[timeout(1000)]
    #[test]
    fn test_invalid_column() {
        let table = orders();
        let filters = FilterSet::new().with(Predicate::new("COLOR", Operator::Eq, "red"));

        assert_eq!(
            apply(&table, &filters).unwrap_err(),
            DashError::InvalidColumn {
                table: "orders".to_string(),
                column: "COLOR".to_string(),
            }
        );
    }

    #[timeout(1000)]
    #[test]
    fn test_ordering_on_text_is_type_mismatch() {
        let table = orders();
        let filters = FilterSet::new().with(Predicate::new("ORDER_ID", Operator::Gt, "A1"));
        assert!(matches!(
            apply(&table, &filters),
            Err(DashError::TypeMismatch { .. })
        ));

        let filters = FilterSet::new().with(Predicate::new("RETURNED_FL", Operator::Lt, true));
        assert!(matches!(
            apply(&table, &filters),
            Err(DashError::TypeMismatch { .. })
        ));
    }

    #[timeout(1000)]
    #[test]
    fn test_uncoercible_value_is_type_mismatch() {
        let table = orders();
        for predicate in [
            Predicate::new("QTY", Operator::Eq, "lots"),
            Predicate::new("RETURNED_FL", Operator::Eq, "maybe"),
            Predicate::new("QTY", Operator::Eq, Value::Null),
        ] {
            let filters = FilterSet::new().with(predicate);
            assert!(matches!(
                apply(&table, &filters),
                Err(DashError::TypeMismatch { .. })
            ));
        }
    }

    #[timeout(1000)]
    #[test]
    fn test_first_invalid_predicate_reported_first() {
        let table = orders();
        let filters = FilterSet::new()
            .with(Predicate::new("NOPE", Operator::Eq, 1))
            .with(Predicate::new("ORDER_ID", Operator::Gt, "A1"));

        assert!(matches!(
            apply(&table, &filters),
            Err(DashError::InvalidColumn { .. })
        ));
    }

    #[timeout(1000)]
    #[test]
    fn test_operator_tokens() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!("==".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!(" >= ".parse::<Operator>().unwrap(), Operator::Ge);
        assert_eq!(
            "!=".parse::<Operator>().unwrap_err(),
            DashError::InvalidOperator("!=".to_string())
        );
    }

    #[timeout(1000)]
    #[test]
    fn test_parse_expression() {
        let p = Predicate::parse_expression("QTY>=10").unwrap();
        assert_eq!(p, Predicate::new("QTY", Operator::Ge, 10));

        let p = Predicate::parse_expression("RETURNED_FL == true").unwrap();
        assert_eq!(p, Predicate::new("RETURNED_FL", Operator::Eq, true));

        let p = Predicate::parse_expression("STATUS=shipped").unwrap();
        assert_eq!(p, Predicate::new("STATUS", Operator::Eq, "shipped"));

        let p = Predicate::parse_expression(r#"STATUS="in transit""#).unwrap();
        assert_eq!(p.value, Value::from("in transit"));

        assert!(matches!(
            Predicate::parse_expression("QTY != 3"),
            Err(DashError::InvalidOperator(_))
        ));
        assert!(matches!(
            Predicate::parse_expression("QTY 3"),
            Err(DashError::InvalidOperator(_))
        ));
    }

    #[timeout(1000)]
    #[test]
    fn test_from_specs_reports_invalid_operator() {
        let specs = vec![
            PredicateSpec {
                column: "QTY".to_string(),
                operator: ">".to_string(),
                value: serde_json::json!(10),
            },
            PredicateSpec {
                column: "QTY".to_string(),
                operator: "~".to_string(),
                value: serde_json::json!(10),
            },
        ];

        assert_eq!(
            FilterSet::from_specs(&specs).unwrap_err(),
            DashError::InvalidOperator("~".to_string())
        );
        assert_eq!(FilterSet::from_specs(&specs[..1]).unwrap().len(), 1);
    }

    #[timeout(1000)]
    #[test]
    fn test_spec_from_expression() {
        let spec = PredicateSpec::parse_expression("QTY>=10").unwrap();
        assert_eq!(spec.column, "QTY");
        assert_eq!(spec.operator, ">=");
        assert_eq!(spec.value, serde_json::json!(10));

        let spec = PredicateSpec::parse_expression("CARRIER=UPS").unwrap();
        assert_eq!(spec.operator, "==");
        assert_eq!(spec.to_predicate().unwrap().value, Value::from("UPS"));
    }
}
