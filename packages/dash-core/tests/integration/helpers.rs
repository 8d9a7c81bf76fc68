//! Shared fixtures for integration tests.

use dash_core::table::{Column, Table};
use dash_core::types::{ColumnType, Value};

pub const EDITABLE: [&str; 2] = ["QTY", "RETURNED_FL"];

pub fn editable_columns() -> Vec<String> {
    EDITABLE.iter().map(|c| c.to_string()).collect()
}

/// Orders table as it arrives from the warehouse, dates still text.
pub fn raw_orders() -> Table {
    Table::from_rows(
        "CSV_FASTSHIP_ORDERS",
        vec![
            Column::new("ORDER_ID", ColumnType::Text),
            Column::new("CARRIER", ColumnType::Text),
            Column::new("QTY", ColumnType::Integer),
            Column::new("PRICE", ColumnType::Float),
            Column::new("RETURNED_FL", ColumnType::Boolean),
            Column::new("ORDER_DATE", ColumnType::Text),
        ],
        vec![
            row("A1", "UPS", 5, 10.0, false, "2024-01-03"),
            row("A2", "DHL", 12, 4.5, true, "2024-01-17"),
            row("A3", "UPS", 20, 7.25, false, "2024-02-02"),
            row("A4", "GLS", 1, 99.0, false, "not a date"),
            row("A5", "DHL", 8, 3.0, true, "2024-03-11"),
        ],
    )
    .unwrap()
}

fn row(id: &str, carrier: &str, qty: i64, price: f64, returned: bool, date: &str) -> Vec<Value> {
    vec![
        id.into(),
        carrier.into(),
        qty.into(),
        price.into(),
        returned.into(),
        date.into(),
    ]
}

/// Random table for property checks.
pub fn random_table(rows: usize, seed: u64) -> Table {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..rows)
        .map(|i| {
            let qty = if rng.gen_bool(0.1) {
                Value::Null
            } else {
                Value::Integer(rng.gen_range(-50..50))
            };
            vec![
                Value::Text(format!("K{i}")),
                qty,
                Value::Float(rng.gen_range(0.0..10.0)),
                Value::Boolean(rng.gen_bool(0.5)),
            ]
        })
        .collect();

    Table::from_rows(
        "generated",
        vec![
            Column::new("ORDER_ID", ColumnType::Text),
            Column::new("QTY", ColumnType::Integer),
            Column::new("PRICE", ColumnType::Float),
            Column::new("RETURNED_FL", ColumnType::Boolean),
        ],
        data,
    )
    .unwrap()
}
