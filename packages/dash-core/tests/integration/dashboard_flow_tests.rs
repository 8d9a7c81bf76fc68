//! End-to-end dashboard flow over an in-memory table.

use ntest::timeout;

use dash_core::change::WorkingCopy;
use dash_core::config::DashConfig;
use dash_core::export;
use dash_core::filter::{self, FilterSet};
use dash_core::stats::{self, Summary};
use dash_core::table::Table;
use dash_core::types::{coerce_date_columns, ColumnType, Value};
use dash_core::DashError;

use super::helpers::{editable_columns, raw_orders};

fn loaded_orders() -> Table {
    coerce_date_columns(raw_orders(), &DashConfig::default().date_column_marker)
}

#[timeout(5000)]
#[test]
fn test_date_columns_coerced_on_load() {
    let table = loaded_orders();
    let column = table.column("ORDER_DATE").unwrap();

    assert_eq!(column.column_type, ColumnType::Temporal);
    assert!(matches!(
        table.value(0, "ORDER_DATE").unwrap(),
        Value::Temporal(_)
    ));
    assert_eq!(table.value(3, "ORDER_DATE").unwrap(), &Value::Null);
}

#[timeout(5000)]
#[test]
fn test_filter_then_chart_data() {
    let table = loaded_orders();
    let filters =
        FilterSet::from_expressions(&["ORDER_DATE>=2024-01-10", "RETURNED_FL==true"]).unwrap();

    let filtered = filter::apply(&table, &filters).unwrap();
    assert_eq!(filtered.row_count(), 2);

    let columns = filters.columns();
    let crosstab = stats::crosstab(&filtered, columns[0], columns[1]).unwrap();
    assert_eq!(crosstab.total(), 2);
    assert_eq!(crosstab.column_labels, vec![Value::Boolean(true)]);

    let sums = stats::group_sum(&filtered, "CARRIER", "QTY").unwrap();
    assert_eq!(sums.get(&"DHL".into()), Some(&Value::Integer(20)));

    let Summary::Numeric(summary) = stats::describe(&filtered) else {
        panic!("expected numeric summary");
    };
    assert_eq!(
        summary.iter().map(|s| s.column.as_str()).collect::<Vec<_>>(),
        vec!["QTY", "PRICE"]
    );
}

#[timeout(5000)]
#[test]
fn test_edit_diff_and_discard() {
    let mut copy = WorkingCopy::new(loaded_orders(), "ORDER_ID", editable_columns()).unwrap();

    copy.stage_update(0, "QTY", Value::Integer(7)).unwrap();
    let changes = copy.changes().unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].key, Value::from("A1"));
    assert_eq!(changes[0].get("QTY"), Some(&Value::Integer(7)));
    assert_eq!(changes[0].get("RETURNED_FL"), Some(&Value::Boolean(false)));

    assert!(matches!(
        copy.stage_update(0, "CARRIER", Value::from("DHL")),
        Err(DashError::ColumnNotEditable { .. })
    ));

    copy.discard();
    assert!(copy.changes().unwrap().is_empty());
}

#[timeout(5000)]
#[test]
fn test_export_filtered_subset() {
    let table = loaded_orders();
    let filters = FilterSet::from_expressions(&["CARRIER=UPS"]).unwrap();
    let csv = export::to_csv(&filter::apply(&table, &filters).unwrap()).unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "ORDER_ID,CARRIER,QTY,PRICE,RETURNED_FL,ORDER_DATE");
    assert_eq!(lines[1], "A1,UPS,5,10.0,false,2024-01-03");
}

#[timeout(5000)]
#[test]
fn test_invalid_filters_surface_errors() {
    let table = loaded_orders();

    let filters = FilterSet::from_expressions(&["WEIGHT>3"]).unwrap();
    assert!(matches!(
        filter::apply(&table, &filters),
        Err(DashError::InvalidColumn { .. })
    ));

    let filters = FilterSet::from_expressions(&["CARRIER>UPS"]).unwrap();
    assert!(matches!(
        filter::apply(&table, &filters),
        Err(DashError::TypeMismatch { .. })
    ));

    assert!(matches!(
        FilterSet::from_expressions(&["QTY!=3"]),
        Err(DashError::InvalidOperator(_))
    ));
}
