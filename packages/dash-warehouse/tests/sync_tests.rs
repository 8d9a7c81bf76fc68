//! Load and write-back against the in-memory warehouse.

use dash_core::change::WorkingCopy;
use dash_core::table::{Column, Table};
use dash_core::types::{ColumnType, Value};
use dash_core::DashError;
use dash_warehouse::{load_table, MemoryWarehouse, SyncResult, SyncWriter, Warehouse};

const TABLE: &str = "CSV_FASTSHIP_ORDERS";

fn orders() -> Table {
    Table::from_rows(
        TABLE,
        vec![
            Column::new("ORDER_ID", ColumnType::Text),
            Column::new("QTY", ColumnType::Integer),
            Column::new("RETURNED_FL", ColumnType::Boolean),
            Column::new("ORDER_DATE", ColumnType::Text),
        ],
        vec![
            vec!["A1".into(), 5.into(), false.into(), "2024-01-01".into()],
            vec!["A2".into(), 9.into(), true.into(), "2024-01-02".into()],
            vec!["A3".into(), 2.into(), false.into(), "2024-01-03".into()],
        ],
    )
    .unwrap()
}

fn editable() -> Vec<String> {
    vec!["QTY".to_string(), "RETURNED_FL".to_string()]
}

#[tokio::test]
async fn test_load_coerces_dates_and_closes_session() {
    let warehouse = MemoryWarehouse::new("public").with_table(orders());

    let table = load_table(&warehouse, TABLE, "date").await.unwrap();

    assert_eq!(table.row_count(), 3);
    assert_eq!(
        table.column("ORDER_DATE").unwrap().column_type,
        ColumnType::Temporal
    );
    assert_eq!(warehouse.sessions_opened(), 1);
    assert_eq!(warehouse.open_sessions(), 0);
}

#[tokio::test]
async fn test_load_missing_table_still_closes_session() {
    let warehouse = MemoryWarehouse::new("public");

    let result = load_table(&warehouse, TABLE, "date").await;

    assert!(matches!(result, Err(DashError::TableNotFound { .. })));
    assert_eq!(warehouse.sessions_opened(), 1);
    assert_eq!(warehouse.open_sessions(), 0);
}

#[tokio::test]
async fn test_load_offline_is_connection_error() {
    let warehouse = MemoryWarehouse::new("public").with_table(orders());
    warehouse.set_offline(true);

    assert!(matches!(
        load_table(&warehouse, TABLE, "date").await,
        Err(DashError::ConnectionError(_))
    ));
}

#[tokio::test]
async fn test_save_reports_each_record_in_order() {
    let warehouse = MemoryWarehouse::new("public").with_table(orders());
    warehouse.reject_key("A2");

    let mut copy = WorkingCopy::new(orders(), "ORDER_ID", editable()).unwrap();
    copy.stage_update(0, "QTY", Value::Integer(7)).unwrap();
    copy.stage_update(1, "QTY", Value::Integer(10)).unwrap();
    copy.stage_update(2, "RETURNED_FL", Value::Boolean(true)).unwrap();

    let writer = SyncWriter::new(&warehouse, TABLE, "ORDER_ID");
    let report = writer.apply(&copy.changes().unwrap()).await.unwrap();

    let results = report.results();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], &SyncResult::Applied);
    assert!(matches!(results[1], SyncResult::Failed(DashError::WriteError(_))));
    assert_eq!(results[2], &SyncResult::Applied);
    assert_eq!(report.applied(), 2);
    assert_eq!(report.failed(), 1);

    let stored = warehouse.table(TABLE).unwrap();
    assert_eq!(stored.value(0, "QTY").unwrap(), &Value::Integer(7));
    assert_eq!(stored.value(1, "QTY").unwrap(), &Value::Integer(9));
    assert_eq!(stored.value(2, "RETURNED_FL").unwrap(), &Value::Boolean(true));

    assert_eq!(warehouse.sessions_opened(), 1);
    assert_eq!(warehouse.open_sessions(), 0);
}

#[tokio::test]
async fn test_save_of_vanished_row_fails_that_record() {
    let warehouse = MemoryWarehouse::new("public").with_table(orders().head(1));

    let mut copy = WorkingCopy::new(orders(), "ORDER_ID", editable()).unwrap();
    copy.stage_update(2, "QTY", Value::Integer(1)).unwrap();

    let writer = SyncWriter::new(&warehouse, TABLE, "ORDER_ID");
    let report = writer.apply(&copy.changes().unwrap()).await.unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].key, Value::from("A3"));
    assert!(matches!(
        report.outcomes[0].result,
        SyncResult::Failed(DashError::WriteError(_))
    ));
}

#[tokio::test]
async fn test_save_without_connection_writes_nothing() {
    let warehouse = MemoryWarehouse::new("public").with_table(orders());
    warehouse.set_offline(true);

    let mut copy = WorkingCopy::new(orders(), "ORDER_ID", editable()).unwrap();
    copy.stage_update(0, "QTY", Value::Integer(7)).unwrap();

    let writer = SyncWriter::new(&warehouse, TABLE, "ORDER_ID");
    let result = writer.apply(&copy.changes().unwrap()).await;

    assert!(matches!(result, Err(DashError::ConnectionError(_))));
    assert_eq!(warehouse.table(TABLE).unwrap(), orders());
}

#[tokio::test]
async fn test_empty_save_opens_no_session() {
    let warehouse = MemoryWarehouse::new("public").with_table(orders());

    let writer = SyncWriter::new(&warehouse, TABLE, "ORDER_ID");
    let report = writer.apply(&[]).await.unwrap();

    assert!(report.is_empty());
    assert_eq!(warehouse.sessions_opened(), 0);
}

#[tokio::test]
async fn test_report_serializes_status_and_reason() {
    let warehouse = MemoryWarehouse::new("public").with_table(orders());
    warehouse.reject_key("A1");

    let mut copy = WorkingCopy::new(orders(), "ORDER_ID", editable()).unwrap();
    copy.stage_update(0, "QTY", Value::Integer(7)).unwrap();

    let report = SyncWriter::new(&warehouse, TABLE, "ORDER_ID")
        .apply(&copy.changes().unwrap())
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcomes"][0]["key"], "A1");
    assert_eq!(json["outcomes"][0]["status"], "failed");
    assert!(json["outcomes"][0]["reason"]
        .as_str()
        .unwrap()
        .starts_with("Write error"));
    assert_eq!(warehouse.describe(), "memory warehouse");
}
