//! Error types for the accounts API client.
//!
//! # Design
//! The server does not return structured error codes, only an
//! `error_message`. `classify` is the one place that maps its vocabulary to
//! `Validation` and `Duplicate`; everything else stays a generic `Remote`.
//! A 404 is a `Remote` error whose `status()` is 404.

use thiserror::Error;

/// Error produced by a `Transport` implementation, passed through untouched.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

const VALIDATION_MARKER: &str = "validation failure";
const DUPLICATE_MARKER: &str = "violates a duplicate constraint";

/// Errors returned by `AccountsClient`, `ClientConfig` and the envelope codec.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL is missing or is not an absolute URL.
    #[error("invalid client configuration: {0}")]
    Configuration(String),

    /// An account id is not a UUID. Raised before any request is sent.
    #[error("invalid account id {0:?}: not a UUID")]
    InvalidIdentifier(String),

    /// The server rejected the payload. The message is the server's, verbatim.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// The server reported a uniqueness constraint violation.
    #[error("{message}")]
    Duplicate { status: u16, message: String },

    /// Any other failed response.
    #[error("{message}")]
    Remote { status: u16, message: String },

    /// The response could not be decoded into the expected shape.
    #[error("malformed response (HTTP {status}): {reason}")]
    MalformedResponse { status: u16, reason: String },

    /// The request payload could not be serialized to JSON.
    #[error("request encoding failed: {0}")]
    Encoding(String),

    /// Network-level failure reported by the transport. `Display` and
    /// `source` forward to the transport's error.
    #[error(transparent)]
    Transport(TransportError),
}

impl ApiError {
    /// HTTP status of the response that caused the error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { status, .. }
            | ApiError::Duplicate { status, .. }
            | ApiError::Remote { status, .. }
            | ApiError::MalformedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Map a server error message to an `ApiError` kind.
pub fn classify(status: u16, message: String) -> ApiError {
    if message.contains(VALIDATION_MARKER) {
        ApiError::Validation { status, message }
    } else if message.contains(DUPLICATE_MARKER) {
        ApiError::Duplicate { status, message }
    } else {
        ApiError::Remote { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_missing_id_as_validation() {
        let err = classify(
            400,
            "validation failure list:\nvalidation failure list:\nid in body is required".to_string(),
        );
        assert!(matches!(err, ApiError::Validation { status: 400, .. }));
        assert!(err.to_string().ends_with("id in body is required"));
    }

    #[test]
    fn classify_duplicate() {
        let err = classify(
            409,
            "Account cannot be created as it violates a duplicate constraint".to_string(),
        );
        assert!(matches!(err, ApiError::Duplicate { status: 409, .. }));
    }

    #[test]
    fn classify_everything_else_as_remote() {
        let err = classify(404, "record 1 does not exist".to_string());
        assert!(matches!(err, ApiError::Remote { status: 404, .. }));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn transport_error_is_passed_through() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = ApiError::Transport(Box::new(inner));
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn transport_error_message_appears_once_in_source_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = ApiError::Transport(Box::new(inner));

        let mut messages = vec![err.to_string()];
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            messages.push(cause.to_string());
            source = cause.source();
        }
        assert_eq!(messages, vec!["connection refused".to_string()]);
    }
}
