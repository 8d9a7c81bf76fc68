//! JSON envelopes.
//!
//! Success: `{"success": true, "data": ...}`.
//! Failure: `{"success": false, "error": {"code": "502", "message": ..., "details": ...}}`,
//! where `details` is structured and only present when there is more to say
//! than the message, e.g. the per-row outcomes of a save that wrote nothing.

use serde::Serialize;
use serde_json::Value as Json;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    /// HTTP status as a string
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Json>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ApiError {
                code: status.to_string(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: Json) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Serialized body; falls back to a bare 500 envelope if `details` cannot be encoded.
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\"}}}}",
                e
            )
            .into_bytes()
        })
    }
}

pub fn success_response<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

pub fn error_response(status: u16, message: impl Into<String>, details: Option<Json>) -> ErrorResponse {
    let response = ErrorResponse::new(status, message);
    match details {
        Some(details) => response.with_details(details),
        None => response,
    }
}
