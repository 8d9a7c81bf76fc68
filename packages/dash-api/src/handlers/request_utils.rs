//! Request utilities for HTTP endpoints.

use http_body_util::BodyExt;
use hyper::{body::Bytes, Request, Response};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::time;

use dash_core::filter::PredicateSpec;
use dash_core::DashError;
use dash_runtime::{AggregateParams, ApiRequest, ResponseSender};

use super::response::success_response;
use crate::router::{AppState, RouterError};

/// Type alias for matchit parameters with explicit lifetimes
pub type MatchitParams<'a, 'b> = matchit::Params<'a, 'b>;

/// Helper function to read request body with timeout
pub async fn read_request_body_with_timeout(
    req: Request<hyper::body::Incoming>,
    timeout_ms: u64,
) -> Result<Bytes, RouterError> {
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let body = time::timeout(timeout_duration, req.collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Failed to read request body: {}", e)))?;
    Ok(body.to_bytes())
}

/// Helper function to wait for response with timeout
pub async fn wait_for_response_with_timeout<T>(
    rx: oneshot::Receiver<T>,
    timeout_ms: u64,
) -> Result<T, RouterError> {
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    time::timeout(timeout_duration, rx)
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Response channel closed: {}", e)))
}

/// Sends a request to the runtime and waits for its answer.
pub async fn dispatch<F>(state: &AppState, build: F) -> Result<serde_json::Value, RouterError>
where
    F: FnOnce(ResponseSender) -> ApiRequest,
{
    let (tx, rx) = oneshot::channel();
    state
        .api_tx
        .send(build(tx))
        .await
        .map_err(|e| RouterError::InternalError(format!("Channel closed: {}", e)))?;

    let result = wait_for_response_with_timeout(rx, state.config.response_timeout_ms).await?;
    result.map_err(map_dash_error)
}

/// Map DashError to appropriate RouterError
pub fn map_dash_error(e: DashError) -> RouterError {
    match e {
        DashError::TableNotFound { .. } | DashError::NoDataset => {
            RouterError::NotFound(e.to_string())
        }
        DashError::ConnectionError(_) | DashError::WriteError(_) => {
            RouterError::BadGateway(e.to_string())
        }
        DashError::Timeout => RouterError::Timeout,
        e if e.is_validation() => RouterError::BadRequest(e.to_string()),
        _ => RouterError::InternalError(format!("Runtime error: {}", e)),
    }
}

/// Body of the filter-driven endpoints.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub filters: Vec<PredicateSpec>,
}

/// Body of `POST /dataset/aggregate`.
#[derive(Debug, Deserialize)]
pub struct AggregateRequest {
    #[serde(default)]
    pub filters: Vec<PredicateSpec>,
    #[serde(flatten)]
    pub params: AggregateParams,
}

/// Body of `PATCH /dataset/rows/{row}`.
#[derive(Debug, Deserialize)]
pub struct EditRowRequest {
    /// Column name to new value
    pub updates: serde_json::Map<String, serde_json::Value>,
}

/// Parses a JSON body; an empty body yields the default.
pub fn parse_body_or_default<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, RouterError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_body(body)
}

pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, RouterError> {
    serde_json::from_slice(body)
        .map_err(|e| RouterError::BadRequest(format!("Failed to parse request: {}", e)))
}

/// Options read from the query string.
#[derive(Debug, Default, PartialEq)]
pub struct DatasetQuery {
    /// Row count for the preview
    pub rows: Option<usize>,
    /// `filter=<expression>` pairs, in order
    pub filters: Vec<PredicateSpec>,
}

/// Parse query parameters from URL query string.
///
/// `rows=N` sets the preview size; each `filter=QTY>=10` adds a predicate.
/// Unknown keys are ignored.
pub fn parse_query_params(query_str: Option<&str>) -> Result<DatasetQuery, RouterError> {
    let mut query = DatasetQuery::default();

    let Some(query_str) = query_str else {
        return Ok(query);
    };

    for pair in query_str.split('&').filter(|p| !p.is_empty()) {
        let Some((key, encoded_value)) = pair.split_once('=') else {
            continue;
        };
        let decoded_value = percent_decode_str(encoded_value).decode_utf8_lossy();

        match key {
            "rows" => {
                query.rows = Some(decoded_value.parse().map_err(|e| {
                    RouterError::BadRequest(format!(
                        "Invalid rows value '{}': {}",
                        decoded_value, e
                    ))
                })?);
            }
            "filter" => {
                let spec =
                    PredicateSpec::parse_expression(&decoded_value).map_err(map_dash_error)?;
                query.filters.push(spec);
            }
            _ => {}
        }
    }

    Ok(query)
}

/// Reads body filters and appends any `filter=` query parameters.
pub async fn read_filters(
    req: Request<hyper::body::Incoming>,
    state: &AppState,
) -> Result<Vec<PredicateSpec>, RouterError> {
    let query = parse_query_params(req.uri().query())?;
    let body = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;

    let mut filters = parse_body_or_default::<FilterRequest>(&body)?.filters;
    filters.extend(query.filters);
    Ok(filters)
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(
    status: u16,
    content_type: &str,
    body: impl Into<Bytes>,
) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .body(body.into())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Wraps runtime output in the success envelope.
pub fn json_response<T: Serialize>(status: u16, data: T) -> Result<Response<Bytes>, RouterError> {
    let json = serde_json::to_vec(&success_response(data))
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(status, "application/json", json)
}
