//! Frequency table between two columns, used as heatmap data.

use serde::Serialize;

use super::{count_labels, label_position};
use crate::error::DashError;
use crate::table::Table;
use crate::types::Value;

/// Co-occurrence counts of two columns' values.
///
/// `counts[i][j]` is the number of rows where the row column equals
/// `row_labels[i]` and the column column equals `column_labels[j]`.
/// Rows with a null in either column are not counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub row_column: String,
    pub column_column: String,
    pub row_labels: Vec<Value>,
    pub column_labels: Vec<Value>,
    pub counts: Vec<Vec<u64>>,
}

impl CrossTab {
    /// Sum of every cell.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn count(&self, row_label: &Value, column_label: &Value) -> u64 {
        match (
            label_position(&self.row_labels, row_label),
            label_position(&self.column_labels, column_label),
        ) {
            (Some(i), Some(j)) => self.counts[i][j],
            _ => 0,
        }
    }
}

/// Counts value pairs of `row_column` x `column_column`, labels sorted.
pub fn crosstab(table: &Table, row_column: &str, column_column: &str) -> Result<CrossTab, DashError> {
    let r = table.require_column(row_column)?;
    let c = table.require_column(column_column)?;

    let pairs: Vec<(&Value, &Value)> = table
        .rows()
        .map(|row| (&row[r], &row[c]))
        .filter(|(a, b)| !a.is_null() && !b.is_null())
        .collect();

    let row_labels = sorted_labels(pairs.iter().map(|(a, _)| *a));
    let column_labels = sorted_labels(pairs.iter().map(|(_, b)| *b));

    let mut counts = vec![vec![0u64; column_labels.len()]; row_labels.len()];
    for (a, b) in &pairs {
        if let (Some(i), Some(j)) = (
            label_position(&row_labels, a),
            label_position(&column_labels, b),
        ) {
            counts[i][j] += 1;
        }
    }

    Ok(CrossTab {
        row_column: row_column.to_string(),
        column_column: column_column.to_string(),
        row_labels,
        column_labels,
        counts,
    })
}

fn sorted_labels<'a>(values: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    count_labels(values)
        .into_iter()
        .map(|(label, _)| label.clone())
        .collect()
}
