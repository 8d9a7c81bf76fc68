//! JSON snapshot files holding whole tables.

mod io_utils;
mod snapshot_store;

pub use io_utils::{classify_io_error, retry_io_operation};
pub use snapshot_store::SnapshotStore;
