//! Scoped table load.

use dash_core::table::Table;
use dash_core::types::coerce_date_columns;
use dash_core::DashError;

use crate::source::Warehouse;
use crate::sql::SelectQuery;

/// Opens a session, reads `table` with `SELECT *`, and closes the session.
///
/// The session is closed whether or not the read succeeds. Text columns
/// whose name contains `date_marker` are parsed as timestamps.
pub async fn load_table(
    warehouse: &dyn Warehouse,
    table: &str,
    date_marker: &str,
) -> Result<Table, DashError> {
    let query = SelectQuery::new(warehouse.schema(), table);
    let mut session = warehouse.connect().await?;

    tracing::debug!("Running {} on {}", query.to_sql(), warehouse.describe());
    let fetched = session.fetch_table(&query).await;

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close warehouse session after load: {}", e);
    }

    let loaded = coerce_date_columns(fetched?, date_marker);
    tracing::info!(
        "Loaded {} rows x {} columns from '{}'",
        loaded.row_count(),
        loaded.column_count(),
        table
    );
    Ok(loaded)
}
