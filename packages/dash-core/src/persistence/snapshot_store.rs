//! Atomic read/write of a set of tables as one JSON document.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::io_utils::{classify_io_error, retry_io_operation};
use crate::config::DashConfig;
use crate::error::DashError;
use crate::table::Table;

/// Snapshot file format.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    /// Snapshot format version
    version: u32,
    tables: Vec<Table>,
}

const SNAPSHOT_VERSION: u32 = 1;

/// Reads and writes table snapshots at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>, config: &DashConfig) -> Self {
        Self {
            path: path.into(),
            max_retries: config.persistence_max_retries,
            retry_delay_ms: config.persistence_retry_delay_ms,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads every table in the snapshot.
    pub fn load(&self) -> Result<Vec<Table>, DashError> {
        let contents = retry_io_operation(
            || {
                fs::read_to_string(&self.path)
                    .map_err(|e| classify_io_error(e, "Failed to read snapshot"))
            },
            self.max_retries,
            self.retry_delay_ms,
            "load_snapshot",
        )?;

        let snapshot: SnapshotFile = serde_json::from_str(&contents)
            .map_err(|e| DashError::SerializationError(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DashError::SerializationError(format!(
                "Unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        tracing::info!(
            "Loaded {} tables from snapshot {}",
            snapshot.tables.len(),
            self.path.display()
        );
        Ok(snapshot.tables)
    }

    /// Writes every table, replacing the previous snapshot atomically.
    pub fn save(&self, tables: &[Table]) -> Result<(), DashError> {
        retry_io_operation(
            || self.save_internal(tables),
            self.max_retries,
            self.retry_delay_ms,
            "save_snapshot",
        )
    }

    fn save_internal(&self, tables: &[Table]) -> Result<(), DashError> {
        let snapshot = SnapshotFile {
            version: SNAPSHOT_VERSION,
            tables: tables.to_vec(),
        };
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| DashError::SerializationError(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| classify_io_error(e, "Failed to create snapshot directory"))?;
        }

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let mut file = File::create(&temp_path)
            .map_err(|e| classify_io_error(e, "Failed to create temp file"))?;
        file.write_all(json.as_bytes())
            .map_err(|e| classify_io_error(e, "Failed to write snapshot"))?;
        file.sync_all()
            .map_err(|e| classify_io_error(e, "Failed to sync snapshot"))?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| classify_io_error(e, "Failed to rename snapshot file"))?;

        tracing::debug!("Wrote snapshot {}", self.path.display());
        Ok(())
    }
}
