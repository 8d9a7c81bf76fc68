//! Summary statistics and chart data over a table.

mod aggregate;
mod crosstab;
mod describe;

pub use aggregate::{group_sum, GroupedSum};
pub use crosstab::{crosstab, CrossTab};
pub use describe::{describe, CategoricalSummary, NumericSummary, Summary};

use crate::types::Value;

/// Distinct non-null values with their counts, sorted by [`Value::sort_cmp`].
pub(crate) fn count_labels<'a, I>(values: I) -> Vec<(&'a Value, usize)>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut present: Vec<&Value> = values.into_iter().filter(|v| !v.is_null()).collect();
    present.sort_by(|a, b| a.sort_cmp(b));

    let mut counts: Vec<(&Value, usize)> = Vec::new();
    for value in present {
        match counts.last_mut() {
            Some((label, count)) if label.sort_cmp(value).is_eq() => *count += 1,
            _ => counts.push((value, 1)),
        }
    }
    counts
}

/// Position of `label` in a list sorted by [`Value::sort_cmp`].
pub(crate) fn label_position(labels: &[Value], label: &Value) -> Option<usize> {
    labels.binary_search_by(|candidate| candidate.sort_cmp(label)).ok()
}
