//! Warehouse and session traits.

use async_trait::async_trait;

use dash_core::table::Table;
use dash_core::DashError;

use crate::sql::{PointUpdate, SelectQuery};

/// A warehouse that can open sessions.
///
/// Implementations hold no open connection between operations; every read
/// or save batch opens its own session and closes it when done.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Opens a session, or fails with `ConnectionError`.
    async fn connect(&self) -> Result<Box<dyn WarehouseSession>, DashError>;

    /// Schema that unqualified table names resolve against.
    fn schema(&self) -> &str;

    /// Human-readable description for logs. Never contains credentials.
    fn describe(&self) -> String;
}

/// An open warehouse session.
#[async_trait]
pub trait WarehouseSession: Send {
    /// Runs a full-table read.
    ///
    /// # Errors
    /// `TableNotFound` if the table does not exist.
    async fn fetch_table(&mut self, query: &SelectQuery) -> Result<Table, DashError>;

    /// Runs one point-update and returns the number of rows it touched.
    async fn execute_update(&mut self, update: &PointUpdate) -> Result<u64, DashError>;

    /// Closes the session.
    async fn close(self: Box<Self>) -> Result<(), DashError>;
}
