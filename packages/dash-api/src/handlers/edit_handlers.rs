//! Working-copy edits and write-back.

use hyper::{body::Bytes, Request, Response};

use crate::router::{AppState, RouterError};
use dash_core::types::Value;
use dash_runtime::ApiRequest;

use super::request_utils::{
    build_response, dispatch, json_response, map_dash_error, parse_body,
    read_request_body_with_timeout, EditRowRequest, MatchitParams,
};
use super::response::ErrorResponse;

/// Stages edits on one row of the working copy.
///
/// # Endpoint
/// `PATCH /dataset/rows/{row}`
///
/// # Request Body
/// ```json
/// {"updates": {"QTY": 7, "RETURNED_FL": true}}
/// ```
///
/// # Response
/// - **200 OK**: the row as it now reads and the number of pending changes
///
/// # Errors
/// - **400 Bad Request**: row out of range, column not editable, or value of the wrong type
///
/// All updates of one request are applied or none are.
pub async fn edit_row(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let raw_row = params.get("row").unwrap_or_default();
    let row: usize = raw_row
        .parse()
        .map_err(|_| RouterError::BadRequest(format!("Invalid row index '{}'", raw_row)))?;

    let body = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    let request: EditRowRequest = parse_body(&body)?;
    if request.updates.is_empty() {
        return Err(RouterError::BadRequest("No updates given".to_string()));
    }

    let updates = request
        .updates
        .iter()
        .map(|(column, json)| Value::from_json(json).map(|value| (column.clone(), value)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_dash_error)?;

    let data = dispatch(&state, |response| ApiRequest::EditRow {
        row,
        updates,
        response,
    })
    .await?;
    json_response(200, data)
}

/// Pending change records, one per edited row.
///
/// # Endpoint
/// `GET /dataset/changes`
pub async fn changes(state: AppState) -> Result<Response<Bytes>, RouterError> {
    let data = dispatch(&state, |response| ApiRequest::Changes { response }).await?;
    json_response(200, data)
}

/// Writes pending changes back to the warehouse.
///
/// # Endpoint
/// `POST /dataset/save`
///
/// # Response
/// - **200 OK**: per-record outcomes, in change order
/// ```json
/// {"applied": 2, "failed": 1, "reloaded": true, "reload_error": null, "pending_changes": 1,
///  "outcomes": [{"row": 0, "key": "A1", "status": "applied"},
///               {"row": 3, "key": "A4", "status": "failed", "reason": "Write error: ..."}]}
/// ```
///
/// # Errors
/// - **502 Bad Gateway**: no warehouse session could be opened, or every
///   update was rejected. Nothing was written; in the second case
///   `error.details` holds the report above and the edits stay pending.
///
/// Each record is its own UPDATE; there is no transaction across records, and a
/// failed record does not stop the rest. When anything was applied the
/// baseline is reloaded from the warehouse and the failed edits are staged
/// again; `pending_changes` counts them.
pub async fn save(state: AppState) -> Result<Response<Bytes>, RouterError> {
    let data = dispatch(&state, |response| ApiRequest::Save { response }).await?;

    let applied = data["applied"].as_u64().unwrap_or(0);
    let failed = data["failed"].as_u64().unwrap_or(0);
    if applied == 0 && failed > 0 {
        let body = ErrorResponse::new(502, format!("The warehouse rejected all {} changes", failed))
            .with_details(data)
            .to_bytes();
        return build_response(502, "application/json", body);
    }

    json_response(200, data)
}

/// Drops pending edits.
///
/// # Endpoint
/// `POST /dataset/discard`
pub async fn discard(state: AppState) -> Result<Response<Bytes>, RouterError> {
    let data = dispatch(&state, |response| ApiRequest::Discard { response }).await?;
    json_response(200, data)
}
