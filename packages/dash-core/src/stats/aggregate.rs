//! Grouped sums, used as bar chart data.

use serde::Serialize;

use super::{count_labels, label_position};
use crate::error::DashError;
use crate::table::Table;
use crate::types::{ColumnType, Value};

/// Per-group totals of a numeric column.
///
/// `groups` are the distinct non-null values of the group column in sorted
/// order; `sums[i]` is the total for `groups[i]`. Integer columns sum to
/// integers, float columns to floats, and null cells add nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSum {
    pub group_column: String,
    pub value_column: String,
    pub groups: Vec<Value>,
    pub sums: Vec<Value>,
}

impl GroupedSum {
    pub fn get(&self, group: &Value) -> Option<&Value> {
        label_position(&self.groups, group).map(|idx| &self.sums[idx])
    }
}

/// Sums `value_column` per distinct value of `group_column`.
///
/// # Errors
/// - `InvalidColumn` if either column is absent
/// - `TypeMismatch` if `value_column` is not numeric
pub fn group_sum(
    table: &Table,
    group_column: &str,
    value_column: &str,
) -> Result<GroupedSum, DashError> {
    let g = table.require_column(group_column)?;
    let v = table.require_column(value_column)?;

    let value_type = table.columns()[v].column_type;
    if !value_type.is_numeric() {
        return Err(DashError::TypeMismatch {
            expected: "numeric column to aggregate".to_string(),
            got: format!("{} column '{}'", value_type, value_column),
        });
    }

    let groups: Vec<Value> = count_labels(table.column_values(g))
        .into_iter()
        .map(|(label, _)| label.clone())
        .collect();

    let mut integer_sums = vec![0i64; groups.len()];
    let mut float_sums = vec![0f64; groups.len()];
    for row in table.rows() {
        let Some(idx) = label_position(&groups, &row[g]) else {
            continue;
        };
        match &row[v] {
            Value::Integer(n) => integer_sums[idx] = integer_sums[idx].saturating_add(*n),
            Value::Float(n) => float_sums[idx] += n,
            _ => {}
        }
    }

    let sums = match value_type {
        ColumnType::Integer => integer_sums.into_iter().map(Value::Integer).collect(),
        _ => float_sums.into_iter().map(Value::Float).collect(),
    };

    tracing::debug!(
        "Summed '{}' by '{}': {} groups",
        value_column,
        group_column,
        groups.len()
    );

    Ok(GroupedSum {
        group_column: group_column.to_string(),
        value_column: value_column.to_string(),
        groups,
        sums,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use ntest::timeout;

    fn orders() -> Table {
        Table::from_rows(
            "orders",
            vec![
                Column::new("CARRIER", ColumnType::Text),
                Column::new("QTY", ColumnType::Integer),
                Column::new("PRICE", ColumnType::Float),
            ],
            vec![
                vec!["UPS".into(), 5.into(), 1.5.into()],
                vec!["DHL".into(), 2.into(), 2.0.into()],
                vec!["UPS".into(), 7.into(), Value::Null],
                vec![Value::Null, 100.into(), 100.0.into()],
                vec!["DHL".into(), Value::Null, 0.5.into()],
            ],
        )
        .unwrap()
    }

    #[timeout(1000)]
    #[test]
    fn test_group_sum_integer_column() {
        let sums = group_sum(&orders(), "CARRIER", "QTY").unwrap();

        assert_eq!(sums.groups, vec![Value::from("DHL"), Value::from("UPS")]);
        assert_eq!(sums.sums, vec![Value::Integer(2), Value::Integer(12)]);
        assert_eq!(sums.get(&"UPS".into()), Some(&Value::Integer(12)));
    }

    #[timeout(1000)]
    #[test]
    fn test_group_sum_float_column() {
        let sums = group_sum(&orders(), "CARRIER", "PRICE").unwrap();
        assert_eq!(sums.sums, vec![Value::Float(2.5), Value::Float(1.5)]);
    }

    #[timeout(1000)]
    #[test]
    fn test_group_sum_requires_numeric_values() {
        assert!(matches!(
            group_sum(&orders(), "QTY", "CARRIER"),
            Err(DashError::TypeMismatch { .. })
        ));
        assert!(matches!(
            group_sum(&orders(), "CARRIER", "WEIGHT"),
            Err(DashError::InvalidColumn { .. })
        ));
    }
}
