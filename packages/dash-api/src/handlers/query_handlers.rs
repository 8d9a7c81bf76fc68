//! Filter-driven endpoints: rows, CSV export and analytics.
//!
//! Each takes `{"filters": [{"column", "operator", "value"}]}` as its body
//! (empty body means no filters); `filter=<expression>` query parameters
//! are appended after the body predicates.

use hyper::{body::Bytes, Request, Response};

use crate::router::{AppState, RouterError};
use dash_runtime::ApiRequest;

use super::request_utils::{
    build_response, dispatch, json_response, parse_body, parse_query_params,
    read_filters, read_request_body_with_timeout, AggregateRequest,
};

/// Filtered rows of the working copy.
///
/// # Endpoint
/// `POST /dataset/query`
///
/// # Request Body
/// ```json
/// {"filters": [{"column": "QTY", "operator": ">=", "value": 10}]}
/// ```
///
/// # Response
/// - **200 OK**: matching rows plus their positions in the working copy
/// ```json
/// {"positions": [1, 4], "total_rows": 5, "table": {"name": "...", "columns": [], "rows": []}}
/// ```
///
/// # Errors
/// - **400 Bad Request**: unknown column, bad operator or a value that does not fit the column
/// - **404 Not Found**: no dataset loaded
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:8080/dataset/query \
///   -H "Content-Type: application/json" \
///   -d '{"filters": [{"column": "RETURNED_FL", "operator": "==", "value": true}]}'
/// ```
pub async fn query(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let filters = read_filters(req, &state).await?;
    let data = dispatch(&state, |response| ApiRequest::Query { filters, response }).await?;
    json_response(200, data)
}

/// Filtered rows as CSV.
///
/// # Endpoint
/// `POST /dataset/export`
///
/// Responds with `text/csv` rather than the JSON envelope.
pub async fn export(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let filters = read_filters(req, &state).await?;
    let data = dispatch(&state, |response| ApiRequest::Export { filters, response }).await?;

    let csv = data
        .as_str()
        .ok_or_else(|| RouterError::InternalError("Invalid response from runtime".to_string()))?;
    build_response(200, "text/csv; charset=utf-8", csv.to_string())
}

/// Summary statistics of the filtered rows.
///
/// # Endpoint
/// `POST /dataset/summary`
///
/// Numeric columns get count/mean/std/min/quartiles/max; a table without
/// numeric columns gets count/unique/top/freq per column.
pub async fn summary(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let filters = read_filters(req, &state).await?;
    let data = dispatch(&state, |response| ApiRequest::Summary { filters, response }).await?;
    json_response(200, data)
}

/// Heatmap counts between the first two filter columns.
///
/// # Endpoint
/// `POST /dataset/crosstab`
///
/// # Errors
/// - **400 Bad Request**: fewer than two filters
pub async fn crosstab(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let filters = read_filters(req, &state).await?;
    let data = dispatch(&state, |response| ApiRequest::CrossTab { filters, response }).await?;
    json_response(200, data)
}

/// Bar chart data: sum of a numeric column per group.
///
/// # Endpoint
/// `POST /dataset/aggregate`
///
/// # Request Body
/// ```json
/// {"filters": [], "value_column": "QTY", "group_by": "CARRIER"}
/// ```
///
/// `group_by` defaults to the first column.
pub async fn aggregate(
    req: Request<hyper::body::Incoming>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let query = parse_query_params(req.uri().query())?;
    let body = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    let mut request: AggregateRequest = parse_body(&body)?;
    request.filters.extend(query.filters);

    let data = dispatch(&state, |response| ApiRequest::Aggregate {
        filters: request.filters,
        params: request.params,
        response,
    })
    .await?;
    json_response(200, data)
}
