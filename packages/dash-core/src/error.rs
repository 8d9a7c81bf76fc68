//! Dashboard error types.

use thiserror::Error;

/// Errors raised by table, filter, diff, and sync operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashError {
    /// Column not present in table
    #[error("Column '{column}' not found in table '{table}'")]
    InvalidColumn { table: String, column: String },

    /// Column declared twice in the same table
    #[error("Column '{column}' already exists in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Value or operator incompatible with a column type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// Unrecognized comparison token
    #[error("Invalid operator '{0}' (expected one of =, ==, >, >=, <, <=)")]
    InvalidOperator(String),

    /// Baseline and working copy have different lengths
    #[error("Row count mismatch: baseline has {baseline} rows, working copy has {working}")]
    RowCountMismatch { baseline: usize, working: usize },

    /// Key column absent from one of the diffed tables
    #[error("Key column '{column}' not found in table '{table}'")]
    MissingKeyColumn { table: String, column: String },

    /// Key values are no longer positionally aligned
    #[error("Key mismatch at row {row}: rows were reordered between baseline and working copy")]
    RowKeyMismatch { row: usize },

    /// Row width differs from the table's column count
    #[error("Row has {got} values, table '{table}' has {expected} columns")]
    RowWidthMismatch {
        table: String,
        expected: usize,
        got: usize,
    },

    /// Row index beyond table bounds
    #[error("Row {row} out of range for table '{table}' ({rows} rows)")]
    RowOutOfRange {
        table: String,
        row: usize,
        rows: usize,
    },

    /// Filter set larger than the configured limit
    #[error("Too many filters: {got} given, at most {max} allowed")]
    TooManyFilters { max: usize, got: usize },

    /// Operation needs more predicates than were given
    #[error("At least {required} filters are required, got {got}")]
    NotEnoughFilters { required: usize, got: usize },

    /// Edit attempted on a column outside the editable set
    #[error("Column '{column}' is not editable")]
    ColumnNotEditable { column: String },

    /// Source table does not exist
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// Operation requires a loaded dataset
    #[error("No dataset loaded")]
    NoDataset,

    /// Destination rejected a point-update
    #[error("Write error: {0}")]
    WriteError(String),

    /// Warehouse session could not be opened or was lost
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Transient I/O error that may succeed on retry
    #[error("Transient I/O error: {0}")]
    TransientIoError(String),

    /// Operation timeout
    #[error("Operation timeout")]
    Timeout,
}

impl DashError {
    /// Returns true for errors caused by the caller's input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DashError::InvalidColumn { .. }
                | DashError::DuplicateColumn { .. }
                | DashError::TypeMismatch { .. }
                | DashError::InvalidOperator(_)
                | DashError::RowCountMismatch { .. }
                | DashError::MissingKeyColumn { .. }
                | DashError::RowKeyMismatch { .. }
                | DashError::RowWidthMismatch { .. }
                | DashError::RowOutOfRange { .. }
                | DashError::ColumnNotEditable { .. }
                | DashError::TooManyFilters { .. }
                | DashError::NotEnoughFilters { .. }
        )
    }
}
