//! Picks the warehouse a binary talks to.

use std::path::Path;
use std::sync::Arc;

use dash_core::config::DashConfig;
use dash_core::persistence::SnapshotStore;
use dash_core::DashError;

use crate::memory::MemoryWarehouse;
use crate::source::Warehouse;

/// Schema reported by snapshot-backed warehouses.
pub const SNAPSHOT_SCHEMA: &str = "public";

/// Opens a snapshot-backed warehouse when `snapshot` is given, otherwise the
/// PostgreSQL warehouse configured through `DASH_WAREHOUSE_*`.
///
/// # Errors
/// `ConfigError` when no snapshot is given and the `postgres` feature is off,
/// or when the warehouse environment is incomplete.
pub fn open_warehouse(
    snapshot: Option<&Path>,
    config: &DashConfig,
) -> Result<Arc<dyn Warehouse>, DashError> {
    if let Some(path) = snapshot {
        let store = SnapshotStore::new(path, config);
        if !store.exists() {
            tracing::warn!("Snapshot {} does not exist yet, starting empty", path.display());
        }
        let warehouse = MemoryWarehouse::open(SNAPSHOT_SCHEMA, store)?;
        return Ok(Arc::new(warehouse));
    }
    open_remote()
}

#[cfg(feature = "postgres")]
fn open_remote() -> Result<Arc<dyn Warehouse>, DashError> {
    let config = crate::config::WarehouseConfig::from_env()?;
    tracing::info!("Using warehouse {:?}", config);
    Ok(Arc::new(crate::postgres::PgWarehouse::new(config)))
}

#[cfg(not(feature = "postgres"))]
fn open_remote() -> Result<Arc<dyn Warehouse>, DashError> {
    Err(DashError::ConfigError(
        "no snapshot given and PostgreSQL support is not compiled in (enable the `postgres` feature)"
            .to_string(),
    ))
}
