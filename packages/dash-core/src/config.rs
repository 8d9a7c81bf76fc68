//! Dashboard configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DashError;

/// Dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashConfig {
    /// Warehouse table loaded with `SELECT *`
    pub table: String,
    /// Column uniquely identifying a row, used to address point-updates
    pub key_column: String,
    /// Columns the user may edit in the working copy
    pub editable_columns: Vec<String>,
    /// Rows returned by the preview endpoint when no count is given
    pub preview_rows: usize,
    /// Columns whose lowercased name contains this marker are parsed as timestamps on load
    pub date_column_marker: String,
    /// Maximum number of predicates in one filter set (0 = number of columns)
    pub max_filters: usize,
    /// Request body read timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Runtime response timeout in milliseconds
    pub response_timeout_ms: u64,
    /// Capacity of the runtime request channel
    pub request_queue_capacity: usize,
    /// Retries for transient snapshot file I/O errors
    pub persistence_max_retries: u32,
    /// Delay between snapshot I/O retries in milliseconds
    pub persistence_retry_delay_ms: u64,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            table: "CSV_FASTSHIP_ORDERS".to_string(),
            key_column: "ORDER_ID".to_string(),
            editable_columns: vec!["QTY".to_string(), "RETURNED_FL".to_string()],
            preview_rows: 5,
            date_column_marker: "date".to_string(),
            max_filters: 0,
            request_timeout_ms: 5000,   // 5 seconds default
            response_timeout_ms: 30000, // loads and saves hit the warehouse
            request_queue_capacity: 64,
            persistence_max_retries: 3,
            persistence_retry_delay_ms: 100,
        }
    }
}

impl DashConfig {
    /// Loads configuration from a JSON file; missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, DashError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            DashError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: DashConfig = serde_json::from_str(&contents).map_err(|e| {
            DashError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), DashError> {
        if self.table.trim().is_empty() {
            return Err(DashError::ConfigError("table must not be empty".to_string()));
        }
        if self.key_column.trim().is_empty() {
            return Err(DashError::ConfigError(
                "key_column must not be empty".to_string(),
            ));
        }
        if self.editable_columns.iter().any(|c| c == &self.key_column) {
            return Err(DashError::ConfigError(format!(
                "key column '{}' cannot be editable",
                self.key_column
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = DashConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn test_from_file_fills_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"table": "ORDERS", "preview_rows": 10}}"#).unwrap();

        let config = DashConfig::from_file(file.path()).unwrap();
        assert_eq!(config.table, "ORDERS");
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.key_column, "ORDER_ID");
    }

    #[test]
    fn test_key_column_cannot_be_editable() {
        let config = DashConfig {
            editable_columns: vec!["ORDER_ID".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DashError::ConfigError(_))
        ));
    }
}
