//! Requests accepted by the runtime.

use dash_core::filter::PredicateSpec;
use dash_core::types::Value;

use crate::ResponseSender;

/// API request from the HTTP server or another in-process caller.
#[derive(Debug)]
pub enum ApiRequest {
    /// Load the configured table, replacing any current dataset
    Load { response: ResponseSender },
    /// First rows of the working copy
    Preview {
        rows: Option<usize>,
        response: ResponseSender,
    },
    /// Column definitions with key and editable flags
    Columns { response: ResponseSender },
    /// Filtered rows and their positions
    Query {
        filters: Vec<PredicateSpec>,
        response: ResponseSender,
    },
    /// Filtered rows as CSV text
    Export {
        filters: Vec<PredicateSpec>,
        response: ResponseSender,
    },
    /// Summary statistics of the filtered rows
    Summary {
        filters: Vec<PredicateSpec>,
        response: ResponseSender,
    },
    /// Crosstab of the first two filter columns over the filtered rows
    CrossTab {
        filters: Vec<PredicateSpec>,
        response: ResponseSender,
    },
    /// Grouped sum over the filtered rows
    Aggregate {
        filters: Vec<PredicateSpec>,
        params: AggregateParams,
        response: ResponseSender,
    },
    /// Stage edits on one row of the working copy
    EditRow {
        row: usize,
        updates: Vec<(String, Value)>,
        response: ResponseSender,
    },
    /// Pending change records
    Changes { response: ResponseSender },
    /// Write pending changes back to the warehouse
    Save { response: ResponseSender },
    /// Drop pending changes
    Discard { response: ResponseSender },
}

impl ApiRequest {
    /// Returns true if the request can modify the session.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            ApiRequest::Load { .. }
                | ApiRequest::EditRow { .. }
                | ApiRequest::Save { .. }
                | ApiRequest::Discard { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ApiRequest::Load { .. } => "load",
            ApiRequest::Preview { .. } => "preview",
            ApiRequest::Columns { .. } => "columns",
            ApiRequest::Query { .. } => "query",
            ApiRequest::Export { .. } => "export",
            ApiRequest::Summary { .. } => "summary",
            ApiRequest::CrossTab { .. } => "crosstab",
            ApiRequest::Aggregate { .. } => "aggregate",
            ApiRequest::EditRow { .. } => "edit_row",
            ApiRequest::Changes { .. } => "changes",
            ApiRequest::Save { .. } => "save",
            ApiRequest::Discard { .. } => "discard",
        }
    }
}

/// Columns for a grouped sum.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct AggregateParams {
    /// Numeric column to sum
    pub value_column: String,
    /// Column to group by; the first column when absent
    #[serde(default)]
    pub group_by: Option<String>,
}
