//! Loaded dataset state and the read/edit operations on it.

use serde::Serialize;

use dash_core::change::{ChangeRecord, WorkingCopy};
use dash_core::config::DashConfig;
use dash_core::export;
use dash_core::filter::{self, FilterSet, PredicateSpec};
use dash_core::stats::{self, CrossTab, GroupedSum, Summary};
use dash_core::table::Table;
use dash_core::types::{ColumnType, Value};
use dash_core::DashError;

use crate::api_request::AggregateParams;
use crate::Result;

/// Column definition as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub key: bool,
    pub editable: bool,
}

/// Filtered rows together with their working-copy positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub positions: Vec<usize>,
    pub total_rows: usize,
    pub table: Table,
}

/// Dashboard session: configuration plus the current dataset, if loaded.
#[derive(Debug)]
pub struct Session {
    config: DashConfig,
    dataset: Option<WorkingCopy>,
}

impl Session {
    pub fn new(config: DashConfig) -> Self {
        Self {
            config,
            dataset: None,
        }
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Returns the current dataset or `NoDataset`.
    pub fn dataset(&self) -> Result<&WorkingCopy> {
        self.dataset.as_ref().ok_or(DashError::NoDataset)
    }

    fn dataset_mut(&mut self) -> Result<&mut WorkingCopy> {
        self.dataset.as_mut().ok_or(DashError::NoDataset)
    }

    /// Installs a freshly loaded table as baseline and working copy.
    pub fn install(&mut self, table: Table) -> Result<()> {
        let copy = WorkingCopy::new(
            table,
            self.config.key_column.clone(),
            self.config.editable_columns.clone(),
        )?;

        if let Some(previous) = &self.dataset {
            if previous.has_changes() {
                tracing::warn!("Reload replaced a working copy with unsaved edits");
            }
        }
        self.dataset = Some(copy);
        Ok(())
    }

    /// Replaces the baseline after a save.
    pub fn rebase(&mut self, table: Table) -> Result<()> {
        self.dataset_mut()?.rebase(table)
    }

    /// Rebases onto `table`, then stages `unsaved` again on the new working copy.
    ///
    /// # Returns
    /// The number of records staged again.
    pub fn rebase_keeping(&mut self, table: Table, unsaved: &[ChangeRecord]) -> Result<usize> {
        let dataset = self.dataset_mut()?;
        dataset.rebase(table)?;
        dataset.restage(unsaved)
    }

    /// Drops the dataset entirely.
    pub fn clear(&mut self) {
        self.dataset = None;
    }

    pub fn preview(&self, rows: Option<usize>) -> Result<Table> {
        let rows = rows.unwrap_or(self.config.preview_rows);
        Ok(self.dataset()?.working().head(rows))
    }

    pub fn columns(&self) -> Result<Vec<ColumnInfo>> {
        let dataset = self.dataset()?;
        Ok(dataset
            .working()
            .columns()
            .iter()
            .map(|column| ColumnInfo {
                name: column.name.clone(),
                column_type: column.column_type,
                key: column.name == dataset.key_column(),
                editable: dataset.is_editable(&column.name),
            })
            .collect())
    }

    /// Parses wire predicates, enforcing the filter count limit.
    ///
    /// The limit is `max_filters`, or the column count when that is zero.
    pub fn filter_set(&self, specs: &[PredicateSpec]) -> Result<FilterSet> {
        let limit = match self.config.max_filters {
            0 => self.dataset()?.working().column_count(),
            max => max,
        };
        if specs.len() > limit {
            return Err(DashError::TooManyFilters {
                max: limit,
                got: specs.len(),
            });
        }
        FilterSet::from_specs(specs)
    }

    fn filtered(&self, specs: &[PredicateSpec]) -> Result<(FilterSet, Table)> {
        let filters = self.filter_set(specs)?;
        let table = filter::apply(self.dataset()?.working(), &filters)?;
        Ok((filters, table))
    }

    pub fn query(&self, specs: &[PredicateSpec]) -> Result<QueryResult> {
        let filters = self.filter_set(specs)?;
        let working = self.dataset()?.working();
        let positions = filter::matching_rows(working, &filters)?;

        Ok(QueryResult {
            total_rows: working.row_count(),
            table: working.select_rows(&positions),
            positions,
        })
    }

    pub fn export(&self, specs: &[PredicateSpec]) -> Result<String> {
        let (_, table) = self.filtered(specs)?;
        export::to_csv(&table)
    }

    pub fn summary(&self, specs: &[PredicateSpec]) -> Result<Summary> {
        let (_, table) = self.filtered(specs)?;
        Ok(stats::describe(&table))
    }

    /// Crosstab of the first filter's column (rows) by the second's (columns).
    pub fn crosstab(&self, specs: &[PredicateSpec]) -> Result<CrossTab> {
        let (filters, table) = self.filtered(specs)?;
        match filters.columns().as_slice() {
            [rows, columns, ..] => stats::crosstab(&table, rows, columns),
            _ => Err(DashError::NotEnoughFilters {
                required: 2,
                got: filters.len(),
            }),
        }
    }

    pub fn aggregate(&self, specs: &[PredicateSpec], params: &AggregateParams) -> Result<GroupedSum> {
        let (_, table) = self.filtered(specs)?;
        let group_by = match &params.group_by {
            Some(column) => column.clone(),
            None => table
                .column_names()
                .first()
                .map(|c| c.to_string())
                .ok_or_else(|| DashError::InvalidColumn {
                    table: table.name().to_string(),
                    column: "<first column>".to_string(),
                })?,
        };
        stats::group_sum(&table, &group_by, &params.value_column)
    }

    /// Stages edits on one row and returns the row as it now reads.
    pub fn edit_row(&mut self, row: usize, updates: &[(String, Value)]) -> Result<Vec<Value>> {
        let dataset = self.dataset_mut()?;
        dataset.stage_updates(row, updates)?;
        tracing::debug!("Staged {} edits on row {}", updates.len(), row);
        Ok(dataset
            .working()
            .row(row)
            .map(|values| values.to_vec())
            .unwrap_or_default())
    }

    pub fn changes(&self) -> Result<Vec<ChangeRecord>> {
        self.dataset()?.changes()
    }

    /// Drops staged edits and returns how many changed rows were discarded.
    pub fn discard(&mut self) -> Result<usize> {
        let dataset = self.dataset_mut()?;
        let discarded = dataset.changes()?.len();
        dataset.discard();
        Ok(discarded)
    }
}
