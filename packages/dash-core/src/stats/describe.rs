//! Column summaries in the shape of a data frame `describe()`.

use serde::Serialize;

use super::count_labels;
use crate::table::Table;
use crate::types::Value;

/// Statistical summary of a table.
///
/// Numeric columns are summarized when the table has any; otherwise every
/// column gets a categorical summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "columns", rename_all = "lowercase")]
pub enum Summary {
    Numeric(Vec<NumericSummary>),
    Categorical(Vec<CategoricalSummary>),
}

impl Summary {
    pub fn len(&self) -> usize {
        match self {
            Summary::Numeric(columns) => columns.len(),
            Summary::Categorical(columns) => columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Count, mean, sample standard deviation, min, quartiles and max.
///
/// Every statistic except `count` is `None` when the column has no
/// non-null values; `std` also needs at least two.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<Value>,
    pub freq: usize,
}

/// Summarizes every numeric column, or every column if none is numeric.
pub fn describe(table: &Table) -> Summary {
    let numeric: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.column_type.is_numeric())
        .map(|(idx, _)| idx)
        .collect();

    if numeric.is_empty() {
        let columns = (0..table.column_count())
            .map(|idx| describe_categorical(table, idx))
            .collect();
        return Summary::Categorical(columns);
    }

    Summary::Numeric(
        numeric
            .into_iter()
            .map(|idx| describe_numeric(table, idx))
            .collect(),
    )
}

fn describe_numeric(table: &Table, index: usize) -> NumericSummary {
    let mut values: Vec<f64> = table
        .column_values(index)
        .filter_map(Value::as_f64)
        .collect();
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
    let std = mean.filter(|_| count > 1).map(|mean| {
        let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (squares / (count - 1) as f64).sqrt()
    });

    NumericSummary {
        column: table.columns()[index].name.clone(),
        count,
        mean,
        std,
        min: values.first().copied(),
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values.last().copied(),
    }
}

fn describe_categorical(table: &Table, index: usize) -> CategoricalSummary {
    let counts = count_labels(table.column_values(index));
    let count = counts.iter().map(|(_, n)| n).sum();

    // first label with the highest count, in sorted label order
    let top = counts
        .iter()
        .fold(None::<(&Value, usize)>, |best, &(label, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((label, n)),
        });

    CategoricalSummary {
        column: table.columns()[index].name.clone(),
        count,
        unique: counts.len(),
        top: top.map(|(label, _)| label.clone()),
        freq: top.map(|(_, n)| n).unwrap_or(0),
    }
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use crate::types::ColumnType;
    use ntest::timeout;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.unwrap();
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[timeout(1000)]
    #[test]
    fn test_numeric_summary() {
        let table = Table::from_rows(
            "orders",
            vec![
                Column::new("STATUS", ColumnType::Text),
                Column::new("QTY", ColumnType::Integer),
            ],
            vec![
                vec!["open".into(), 1.into()],
                vec!["open".into(), 2.into()],
                vec!["closed".into(), 3.into()],
                vec!["closed".into(), 4.into()],
                vec!["closed".into(), Value::Null],
            ],
        )
        .unwrap();

        let Summary::Numeric(columns) = describe(&table) else {
            panic!("expected numeric summary");
        };
        assert_eq!(columns.len(), 1);

        let qty = &columns[0];
        assert_eq!(qty.column, "QTY");
        assert_eq!(qty.count, 4);
        assert_close(qty.mean, 2.5);
        assert_close(qty.std, 1.2909944487358056);
        assert_close(qty.min, 1.0);
        assert_close(qty.q25, 1.75);
        assert_close(qty.median, 2.5);
        assert_close(qty.q75, 3.25);
        assert_close(qty.max, 4.0);
    }

    #[timeout(1000)]
    #[test]
    fn test_single_value_has_no_std() {
        let table = Table::from_rows(
            "orders",
            vec![Column::new("PRICE", ColumnType::Float)],
            vec![vec![9.5.into()]],
        )
        .unwrap();

        let Summary::Numeric(columns) = describe(&table) else {
            panic!("expected numeric summary");
        };
        assert_eq!(columns[0].std, None);
        assert_eq!(columns[0].median, Some(9.5));
    }

    #[timeout(1000)]
    #[test]
    fn test_categorical_summary_without_numeric_columns() {
        let table = Table::from_rows(
            "orders",
            vec![Column::new("STATUS", ColumnType::Text)],
            vec![
                vec!["open".into()],
                vec!["closed".into()],
                vec!["open".into()],
                vec![Value::Null],
            ],
        )
        .unwrap();

        let Summary::Categorical(columns) = describe(&table) else {
            panic!("expected categorical summary");
        };
        let status = &columns[0];
        assert_eq!(status.count, 3);
        assert_eq!(status.unique, 2);
        assert_eq!(status.top, Some(Value::from("open")));
        assert_eq!(status.freq, 2);
    }

    #[timeout(1000)]
    #[test]
    fn test_empty_table() {
        let table = Table::create("orders", vec![Column::new("QTY", ColumnType::Integer)]).unwrap();

        let Summary::Numeric(columns) = describe(&table) else {
            panic!("expected numeric summary");
        };
        assert_eq!(columns[0].count, 0);
        assert_eq!(columns[0].mean, None);
        assert_eq!(columns[0].min, None);
    }

    #[timeout(1000)]
    #[test]
    fn test_serialized_shape() {
        let table = Table::from_rows(
            "orders",
            vec![Column::new("QTY", ColumnType::Integer)],
            vec![vec![1.into()], vec![3.into()]],
        )
        .unwrap();

        let json = serde_json::to_value(describe(&table)).unwrap();
        assert_eq!(json["kind"], "numeric");
        assert_eq!(json["columns"][0]["50%"], 2.0);
    }
}
