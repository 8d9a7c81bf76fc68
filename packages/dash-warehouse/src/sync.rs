//! Best-effort write-back of change records.
//!
//! Each record becomes one point-update. Updates are not wrapped in a
//! transaction: a failure on one record is reported for that record and
//! the batch moves on, so a partially applied save is possible. Retrying a
//! save re-sends the same values, which makes it at-least-once.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use dash_core::change::ChangeRecord;
use dash_core::types::Value;
use dash_core::DashError;

use crate::source::{Warehouse, WarehouseSession};
use crate::sql::PointUpdate;

/// Outcome of one point-update.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncResult {
    Applied,
    Failed(DashError),
}

impl SyncResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncResult::Applied)
    }
}

impl Serialize for SyncResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SyncResult::Applied => {
                let mut state = serializer.serialize_struct("SyncResult", 1)?;
                state.serialize_field("status", "applied")?;
                state.end()
            }
            SyncResult::Failed(reason) => {
                let mut state = serializer.serialize_struct("SyncResult", 2)?;
                state.serialize_field("status", "failed")?;
                state.serialize_field("reason", &reason.to_string())?;
                state.end()
            }
        }
    }
}

/// Result for one change record, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub row: usize,
    pub key: Value,
    #[serde(flatten)]
    pub result: SyncResult,
}

/// Per-record results of a save.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_applied()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.applied()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn results(&self) -> Vec<&SyncResult> {
        self.outcomes.iter().map(|o| &o.result).collect()
    }
}

/// Writes change records to one table of a warehouse.
pub struct SyncWriter<'a> {
    warehouse: &'a dyn Warehouse,
    table: String,
    key_column: String,
}

impl<'a> SyncWriter<'a> {
    pub fn new(
        warehouse: &'a dyn Warehouse,
        table: impl Into<String>,
        key_column: impl Into<String>,
    ) -> Self {
        Self {
            warehouse,
            table: table.into(),
            key_column: key_column.into(),
        }
    }

    /// Applies every record in order within one session.
    ///
    /// # Errors
    /// `ConnectionError` if no session can be opened; nothing is written
    /// in that case. Per-record failures are reported in the returned
    /// [`SyncReport`] instead.
    pub async fn apply(&self, records: &[ChangeRecord]) -> Result<SyncReport, DashError> {
        if records.is_empty() {
            return Ok(SyncReport::default());
        }

        let mut session = self.warehouse.connect().await?;
        let mut report = SyncReport {
            outcomes: Vec::with_capacity(records.len()),
        };

        for record in records {
            let result = self.apply_record(session.as_mut(), record).await;
            if let SyncResult::Failed(reason) = &result {
                tracing::warn!("Update of {} = {} failed: {}", self.key_column, record.key, reason);
            }
            report.outcomes.push(SyncOutcome {
                row: record.row,
                key: record.key.clone(),
                result,
            });
        }

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close warehouse session after save: {}", e);
        }

        tracing::info!(
            "Saved '{}': {} applied, {} failed",
            self.table,
            report.applied(),
            report.failed()
        );
        Ok(report)
    }

    async fn apply_record(
        &self,
        session: &mut dyn WarehouseSession,
        record: &ChangeRecord,
    ) -> SyncResult {
        let update = PointUpdate::from_record(
            self.warehouse.schema(),
            self.table.as_str(),
            self.key_column.as_str(),
            record,
        );

        match session.execute_update(&update).await {
            Ok(0) => SyncResult::Failed(DashError::WriteError(format!(
                "no row with {} = {}",
                self.key_column, record.key
            ))),
            Ok(affected) => {
                if affected > 1 {
                    tracing::warn!(
                        "Update of {} = {} touched {} rows",
                        self.key_column,
                        record.key,
                        affected
                    );
                }
                SyncResult::Applied
            }
            Err(e @ DashError::WriteError(_)) => SyncResult::Failed(e),
            Err(e) => SyncResult::Failed(DashError::WriteError(e.to_string())),
        }
    }
}
