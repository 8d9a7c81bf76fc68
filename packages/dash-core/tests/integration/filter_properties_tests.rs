//! Filter, diff and crosstab properties over generated tables.

use ntest::timeout;

use dash_core::change::{diff, WorkingCopy};
use dash_core::filter::{self, FilterSet, Operator, Predicate};
use dash_core::stats;
use dash_core::types::Value;

use super::helpers::{editable_columns, random_table, EDITABLE};

#[timeout(5000)]
#[test]
fn test_filter_output_is_ordered_subsequence() {
    for seed in 0..10 {
        let table = random_table(200, seed);
        let filters = FilterSet::new()
            .with(Predicate::new("QTY", Operator::Gt, 0))
            .with(Predicate::new("PRICE", Operator::Le, 7.5));

        let indices = filter::matching_rows(&table, &filters).unwrap();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));

        let filtered = filter::apply(&table, &filters).unwrap();
        assert_eq!(filtered.row_count(), indices.len());
        assert_eq!(filtered.columns(), table.columns());

        for (out_row, &src_row) in indices.iter().enumerate() {
            assert_eq!(filtered.row(out_row), table.row(src_row));
        }
    }
}

#[timeout(5000)]
#[test]
fn test_filter_keeps_exactly_satisfying_rows() {
    let table = random_table(300, 42);
    let filters = FilterSet::new().with(Predicate::new("QTY", Operator::Ge, 10));
    let kept = filter::matching_rows(&table, &filters).unwrap();

    for (idx, row) in table.rows().enumerate() {
        let satisfies = matches!(row[1], Value::Integer(q) if q >= 10);
        assert_eq!(kept.contains(&idx), satisfies, "row {idx}");
    }
}

#[timeout(5000)]
#[test]
fn test_filter_conjunction_is_intersection() {
    let table = random_table(300, 7);
    let a = Predicate::new("QTY", Operator::Lt, 0);
    let b = Predicate::new("RETURNED_FL", Operator::Eq, true);

    let only_a = filter::matching_rows(&table, &FilterSet::new().with(a.clone())).unwrap();
    let only_b = filter::matching_rows(&table, &FilterSet::new().with(b.clone())).unwrap();
    let both = filter::matching_rows(&table, &FilterSet::new().with(a).with(b)).unwrap();

    let expected: Vec<usize> = only_a.into_iter().filter(|i| only_b.contains(i)).collect();
    assert_eq!(both, expected);
}

#[timeout(5000)]
#[test]
fn test_self_diff_is_empty() {
    for seed in 0..5 {
        let table = random_table(100, seed);
        assert!(diff(&table, &table, "ORDER_ID", &EDITABLE).unwrap().is_empty());
    }
}

#[timeout(5000)]
#[test]
fn test_diff_reports_exactly_edited_rows() {
    let table = random_table(100, 3);
    let mut copy = WorkingCopy::new(table, "ORDER_ID", editable_columns()).unwrap();

    for row in [3, 50, 97] {
        copy.stage_update(row, "QTY", Value::Integer(1_000)).unwrap();
    }
    // writing the current value back is not a change
    let current = copy.working().value(10, "RETURNED_FL").unwrap().clone();
    copy.stage_update(10, "RETURNED_FL", current).unwrap();

    let rows: Vec<usize> = copy.changes().unwrap().iter().map(|r| r.row).collect();
    assert_eq!(rows, vec![3, 50, 97]);
}

#[timeout(5000)]
#[test]
fn test_crosstab_total_matches_non_null_pairs() {
    let table = random_table(250, 11);
    let crosstab = stats::crosstab(&table, "QTY", "RETURNED_FL").unwrap();

    let non_null = table.rows().filter(|row| !row[1].is_null()).count() as u64;
    assert_eq!(crosstab.total(), non_null);
}
