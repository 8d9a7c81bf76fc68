//! Load, preview and column endpoints.

use hyper::{body::Bytes, Request, Response};

use crate::router::{AppState, RouterError};
use dash_runtime::ApiRequest;

use super::request_utils::{dispatch, json_response, parse_query_params};

/// Loads the configured table from the warehouse.
///
/// # Endpoint
/// `POST /dataset/load`
///
/// # Response
/// - **200 OK**: table name, row count and columns
/// ```json
/// {"table": "CSV_FASTSHIP_ORDERS", "rows": 1200, "columns": [{"name": "ORDER_ID", "type": "text"}]}
/// ```
///
/// # Errors
/// - **404 Not Found**: table missing in the warehouse
/// - **502 Bad Gateway**: warehouse unreachable
///
/// Loading replaces the current working copy, unsaved edits included.
pub async fn load(state: AppState) -> Result<Response<Bytes>, RouterError> {
    let data = dispatch(&state, |response| ApiRequest::Load { response }).await?;
    json_response(200, data)
}

/// First rows of the working copy.
///
/// # Endpoint
/// `GET /dataset?rows=N`
///
/// `rows` defaults to the configured preview size.
///
/// # Example
/// ```bash
/// curl http://localhost:8080/dataset?rows=10
/// ```
pub async fn preview(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let rows = parse_query_params(req.uri().query())?.rows;
    let data = dispatch(&state, |response| ApiRequest::Preview { rows, response }).await?;
    json_response(200, data)
}

/// Column names and types with key/editable flags.
///
/// # Endpoint
/// `GET /dataset/columns`
pub async fn columns(state: AppState) -> Result<Response<Bytes>, RouterError> {
    let data = dispatch(&state, |response| ApiRequest::Columns { response }).await?;
    json_response(200, data)
}
