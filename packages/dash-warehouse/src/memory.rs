//! In-process warehouse for tests, demos and offline use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use dash_core::persistence::SnapshotStore;
use dash_core::table::Table;
use dash_core::types::Value;
use dash_core::DashError;

use crate::source::{Warehouse, WarehouseSession};
use crate::sql::{PointUpdate, SelectQuery};

struct Inner {
    schema: String,
    tables: Mutex<HashMap<String, Table>>,
    store: Option<SnapshotStore>,
    offline: AtomicBool,
    rejected_keys: Mutex<Vec<Value>>,
    sessions_opened: AtomicUsize,
    sessions_closed: AtomicUsize,
}

/// Tables held in memory, optionally mirrored to a JSON snapshot.
///
/// With a snapshot store attached, every update that touches a row
/// rewrites the snapshot before it is reported as applied.
#[derive(Clone)]
pub struct MemoryWarehouse {
    inner: Arc<Inner>,
}

impl MemoryWarehouse {
    pub fn new(schema: impl Into<String>) -> Self {
        Self::build(schema.into(), HashMap::new(), None)
    }

    /// Opens a warehouse backed by `store`, loading its tables if the file exists.
    pub fn open(schema: impl Into<String>, store: SnapshotStore) -> Result<Self, DashError> {
        let tables = if store.exists() {
            store
                .load()?
                .into_iter()
                .map(|t| (t.name().to_string(), t))
                .collect()
        } else {
            HashMap::new()
        };
        Ok(Self::build(schema.into(), tables, Some(store)))
    }

    fn build(schema: String, tables: HashMap<String, Table>, store: Option<SnapshotStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                schema,
                tables: Mutex::new(tables),
                store,
                offline: AtomicBool::new(false),
                rejected_keys: Mutex::new(Vec::new()),
                sessions_opened: AtomicUsize::new(0),
                sessions_closed: AtomicUsize::new(0),
            }),
        }
    }

    /// Builder-style [`MemoryWarehouse::insert_table`].
    pub fn with_table(self, table: Table) -> Self {
        self.insert_table(table);
        self
    }

    pub fn insert_table(&self, table: Table) {
        self.inner
            .tables
            .lock()
            .insert(table.name().to_string(), table);
    }

    /// Returns a copy of a stored table.
    pub fn table(&self, name: &str) -> Option<Table> {
        self.inner.tables.lock().get(name).cloned()
    }

    /// While offline, `connect` fails with `ConnectionError`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes every update addressed to `key` fail with `WriteError`.
    pub fn reject_key(&self, key: impl Into<Value>) {
        self.inner.rejected_keys.lock().push(key.into());
    }

    /// Sessions opened and not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.inner.sessions_opened.load(Ordering::SeqCst)
            - self.inner.sessions_closed.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> usize {
        self.inner.sessions_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn connect(&self) -> Result<Box<dyn WarehouseSession>, DashError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(DashError::ConnectionError(
                "memory warehouse is offline".to_string(),
            ));
        }
        self.inner.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            inner: Arc::clone(&self.inner),
        }))
    }

    fn schema(&self) -> &str {
        &self.inner.schema
    }

    fn describe(&self) -> String {
        match &self.inner.store {
            Some(store) => format!("memory warehouse ({})", store.path().display()),
            None => "memory warehouse".to_string(),
        }
    }
}

struct MemorySession {
    inner: Arc<Inner>,
}

impl MemorySession {
    fn check_schema(&self, schema: &str, table: &str) -> Result<(), DashError> {
        if schema.is_empty() || schema == self.inner.schema {
            Ok(())
        } else {
            Err(DashError::TableNotFound {
                table: format!("{}.{}", schema, table),
            })
        }
    }
}

#[async_trait]
impl WarehouseSession for MemorySession {
    async fn fetch_table(&mut self, query: &SelectQuery) -> Result<Table, DashError> {
        self.check_schema(&query.schema, &query.table)?;
        self.inner
            .tables
            .lock()
            .get(&query.table)
            .cloned()
            .ok_or_else(|| DashError::TableNotFound {
                table: query.table.clone(),
            })
    }

    async fn execute_update(&mut self, update: &PointUpdate) -> Result<u64, DashError> {
        self.check_schema(&update.schema, &update.table)?;

        if self.inner.rejected_keys.lock().contains(&update.key) {
            return Err(DashError::WriteError(format!(
                "update rejected for {} = {}",
                update.key_column, update.key
            )));
        }

        let mut tables = self.inner.tables.lock();
        let table = tables
            .get(&update.table)
            .ok_or_else(|| DashError::TableNotFound {
                table: update.table.clone(),
            })?;

        let key_index = table.require_column(&update.key_column)?;
        let matching: Vec<usize> = table
            .rows()
            .enumerate()
            .filter(|(_, row)| row[key_index] == update.key)
            .map(|(idx, _)| idx)
            .collect();

        if matching.is_empty() {
            return Ok(0);
        }

        // stage on a copy so a rejected value leaves the stored table intact
        let mut updated = table.clone();
        for &row in &matching {
            for field in &update.assignments {
                updated.set_value(row, &field.column, field.value.clone())?;
            }
        }

        if let Some(store) = &self.inner.store {
            let mut snapshot: Vec<Table> = tables
                .iter()
                .filter(|(name, _)| name.as_str() != update.table)
                .map(|(_, t)| t.clone())
                .collect();
            snapshot.push(updated.clone());
            snapshot.sort_by(|a, b| a.name().cmp(b.name()));
            store.save(&snapshot)?;
        }

        tables.insert(update.table.clone(), updated);
        Ok(matching.len() as u64)
    }

    async fn close(self: Box<Self>) -> Result<(), DashError> {
        self.inner.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
