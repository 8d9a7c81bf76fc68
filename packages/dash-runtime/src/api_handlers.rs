//! API request handlers

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use dash_core::change::ChangeRecord;
use dash_core::config::DashConfig;
use dash_core::DashError;
use dash_warehouse::{load_table, SyncWriter, Warehouse};

use crate::api_request::ApiRequest;
use crate::session::Session;
use crate::Result;

/// API request handlers
pub struct ApiHandlers {
    /// Session state
    session: Session,
    /// Warehouse for loads and saves
    warehouse: Arc<dyn Warehouse>,
}

impl ApiHandlers {
    /// Create new API handlers
    pub fn new(config: DashConfig, warehouse: Arc<dyn Warehouse>) -> Self {
        Self {
            session: Session::new(config),
            warehouse,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handle API request, sending the result through its response channel.
    ///
    /// A dropped receiver is ignored; the caller has stopped waiting.
    pub async fn handle_api_request(&mut self, req: ApiRequest) {
        match req {
            ApiRequest::Load { response } => {
                let result = self.handle_load().await;
                let _ = response.send(result);
            }
            ApiRequest::Preview { rows, response } => {
                let result = self.session.preview(rows).and_then(|t| to_json(&t));
                let _ = response.send(result);
            }
            ApiRequest::Columns { response } => {
                let result = self.session.columns().and_then(|c| to_json(&c));
                let _ = response.send(result);
            }
            ApiRequest::Query { filters, response } => {
                let result = self.session.query(&filters).and_then(|q| to_json(&q));
                let _ = response.send(result);
            }
            ApiRequest::Export { filters, response } => {
                let result = self.session.export(&filters).map(serde_json::Value::String);
                let _ = response.send(result);
            }
            ApiRequest::Summary { filters, response } => {
                let result = self.session.summary(&filters).and_then(|s| to_json(&s));
                let _ = response.send(result);
            }
            ApiRequest::CrossTab { filters, response } => {
                let result = self.session.crosstab(&filters).and_then(|c| to_json(&c));
                let _ = response.send(result);
            }
            ApiRequest::Aggregate {
                filters,
                params,
                response,
            } => {
                let result = self
                    .session
                    .aggregate(&filters, &params)
                    .and_then(|g| to_json(&g));
                let _ = response.send(result);
            }
            ApiRequest::EditRow {
                row,
                updates,
                response,
            } => {
                let result = self.handle_edit_row(row, &updates);
                let _ = response.send(result);
            }
            ApiRequest::Changes { response } => {
                let result = self.session.changes().and_then(|c| to_json(&c));
                let _ = response.send(result);
            }
            ApiRequest::Save { response } => {
                let result = self.handle_save().await;
                let _ = response.send(result);
            }
            ApiRequest::Discard { response } => {
                let result = self
                    .session
                    .discard()
                    .map(|discarded| json!({ "discarded": discarded }));
                let _ = response.send(result);
            }
        }
    }

    async fn load(&self) -> Result<dash_core::table::Table> {
        let config = self.session.config();
        load_table(
            self.warehouse.as_ref(),
            &config.table,
            &config.date_column_marker,
        )
        .await
    }

    async fn handle_load(&mut self) -> Result<serde_json::Value> {
        let table = self.load().await?;
        let info = json!({
            "table": table.name(),
            "rows": table.row_count(),
            "columns": table.columns(),
        });
        self.session.install(table)?;
        Ok(info)
    }

    fn handle_edit_row(
        &mut self,
        row: usize,
        updates: &[(String, dash_core::types::Value)],
    ) -> Result<serde_json::Value> {
        let values = self.session.edit_row(row, updates)?;
        let pending = self.session.changes()?.len();
        Ok(json!({
            "row": row,
            "values": values,
            "pending_changes": pending,
        }))
    }

    /// Writes pending changes, then reloads the baseline if anything was applied.
    ///
    /// A failed reload drops the dataset, since the baseline no longer
    /// matches the warehouse; the client has to load again.
    async fn handle_save(&mut self) -> Result<serde_json::Value> {
        let records = self.session.changes()?;
        if records.is_empty() {
            return Ok(json!({
                "applied": 0,
                "failed": 0,
                "outcomes": [],
                "reloaded": false,
            }));
        }

        let config = self.session.config();
        let writer = SyncWriter::new(
            self.warehouse.as_ref(),
            config.table.as_str(),
            config.key_column.as_str(),
        );
        let report = writer.apply(&records).await?;

        let unsaved: Vec<ChangeRecord> = records
            .into_iter()
            .zip(&report.outcomes)
            .filter(|(_, outcome)| !outcome.result.is_applied())
            .map(|(record, _)| record)
            .collect();

        let mut reload_error: Option<DashError> = None;
        let mut restaged = 0;
        if report.applied() > 0 {
            let reloaded = match self.load().await {
                Ok(table) => self.session.rebase_keeping(table, &unsaved),
                Err(e) => Err(e),
            };
            match reloaded {
                Ok(n) => restaged = n,
                Err(e) => {
                    tracing::error!("Reload after save failed, dropping dataset: {}", e);
                    self.session.clear();
                    reload_error = Some(e);
                }
            }
        } else {
            restaged = unsaved.len();
        }

        if restaged < unsaved.len() {
            tracing::warn!(
                "{} failed edits could not be kept after reload",
                unsaved.len() - restaged
            );
        }

        Ok(json!({
            "applied": report.applied(),
            "failed": report.failed(),
            "outcomes": report.outcomes,
            "reloaded": report.applied() > 0 && reload_error.is_none(),
            "reload_error": reload_error.map(|e| e.to_string()),
            "pending_changes": restaged,
        }))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| DashError::SerializationError(e.to_string()))
}
