//! Core data engine for the exploration dashboard.
//!
//! Provides typed tables, predicate filtering, working-copy change
//! detection, summary statistics, CSV import/export, and JSON table snapshots.

pub mod change;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod import;
pub mod persistence;
pub mod stats;
pub mod table;
pub mod types;

pub use change::{diff, ChangeRecord, WorkingCopy};
pub use error::DashError;
pub use filter::{FilterSet, Operator, Predicate};
pub use table::{Column, Table};
pub use types::{ColumnType, Value};
