//! Table schema, rows, and row selection.

mod column;
mod query;
mod snapshot;
#[allow(clippy::module_inception)]
mod table;
pub(crate) mod validation;

pub use column::Column;
pub use snapshot::TableSnapshot;
pub use table::Table;
