//! HTTP endpoint implementations for the dataset routes.

mod dataset_handlers;
mod edit_handlers;
mod query_handlers;
mod request_utils;
mod response;

pub use dataset_handlers::{columns, load, preview};
pub use edit_handlers::{changes, discard, edit_row, save};
pub use query_handlers::{aggregate, crosstab, export, query, summary};
pub use request_utils::{map_dash_error, parse_query_params, DatasetQuery};
pub use response::{error_response, success_response, ApiError, ApiResponse, ErrorResponse};
