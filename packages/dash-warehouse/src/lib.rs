//! Warehouse access for the dashboard.
//!
//! A [`Warehouse`] hands out short-lived sessions. Reads go through
//! [`load_table`], write-back through [`SyncWriter`]; both close their
//! session on every exit path.

pub mod backend;
pub mod config;
pub mod loader;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod source;
pub mod sql;
pub mod sync;

pub use backend::open_warehouse;
pub use config::WarehouseConfig;
pub use loader::load_table;
pub use memory::MemoryWarehouse;
#[cfg(feature = "postgres")]
pub use postgres::PgWarehouse;
pub use source::{Warehouse, WarehouseSession};
pub use sql::{PointUpdate, SelectColumn, SelectQuery};
pub use sync::{SyncOutcome, SyncReport, SyncResult, SyncWriter};
