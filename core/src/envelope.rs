//! `{"data": ...}` envelope codec and status-aware response decoding.
//!
//! Decoding order for resource responses:
//! 1. a failed status with a blank body becomes a `Remote` error built from
//!    the status line;
//! 2. a non-JSON content type is a `MalformedResponse`;
//! 3. a failed status decodes the `ErrorPayload` and classifies it;
//! 4. anything else decodes into the target type.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{classify, ApiError};
use crate::http::HttpResponse;
use crate::types::ErrorPayload;

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Serialize)]
struct Outgoing<'a, T> {
    data: &'a T,
}

/// Wrap `value` as `{"data": value}` and serialize it.
pub fn encode<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(&Outgoing { data: value }).map_err(|e| ApiError::Encoding(e.to_string()))
}

/// Decode a response whose success body is `T`.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    if !response.is_success() && response.is_blank() {
        return Err(status_line_error(response.status));
    }
    if !is_json(response) {
        return Err(ApiError::MalformedResponse {
            status: response.status,
            reason: format!(
                "expected {JSON_CONTENT_TYPE}, got {:?}",
                response.header("content-type").unwrap_or_default()
            ),
        });
    }
    if !response.is_success() {
        let payload: ErrorPayload = serde_json::from_slice(&response.body).map_err(|e| malformed(response, e))?;
        return Err(classify(response.status, payload.error_message));
    }
    serde_json::from_slice(&response.body).map_err(|e| malformed(response, e))
}

/// Decode a response that must be `204 No Content`.
///
/// Every other status fails, 2xx included. A JSON `error_message` is
/// surfaced when present; otherwise the error comes from the status line.
pub fn decode_no_content(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 204 {
        return Ok(());
    }
    if is_json(response) && !response.is_blank() {
        if let Ok(payload) = serde_json::from_slice::<ErrorPayload>(&response.body) {
            return Err(classify(response.status, payload.error_message));
        }
    }
    Err(status_line_error(response.status))
}

fn is_json(response: &HttpResponse) -> bool {
    response
        .header("content-type")
        .is_some_and(|value| value.to_ascii_lowercase().contains(JSON_CONTENT_TYPE))
}

fn malformed(response: &HttpResponse, err: serde_json::Error) -> ApiError {
    ApiError::MalformedResponse {
        status: response.status,
        reason: err.to_string(),
    }
}

/// Build a `Remote` error from the status code and its canonical reason.
fn status_line_error(status: u16) -> ApiError {
    let reason = ::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown Status");
    ApiError::Remote {
        status,
        message: format!("request failed with status: {status} {reason}"),
    }
}
