//! Failure normalization shared by every backend.
//!
//! Any failure surfaced by a send is first described as a [`TransportFailure`]
//! and then collapsed by [`normalize`] into a single [`NormalizedError`]. The
//! classification is backend-agnostic; the backend name only tags the log
//! event.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

/// Payload of every [`ErrorKind::NoResponse`] error.
pub const NO_RESPONSE_MESSAGE: &str = "No response received from server";

/// Normalized failure categories, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A response arrived with a non-success status.
    ServerError,
    /// The request was dispatched but no response arrived.
    NoResponse,
    /// The request could not be built or dispatched.
    RequestSetupError,
}

impl ErrorKind {
    /// Name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerError => "ServerError",
            Self::NoResponse => "NoResponse",
            Self::RequestSetupError => "RequestSetupError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw failure, before normalization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportFailure {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    Status { status: u16, body: Vec<u8> },

    /// Dispatched, but nothing came back.
    #[error("no response: {reason}")]
    NoResponse { reason: String },

    /// Failed while building or dispatching the request.
    #[error("request setup failed: {message}")]
    Setup { message: String },
}

impl TransportFailure {
    /// Create a setup failure.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    /// Create a no-response failure.
    pub fn no_response(reason: impl Into<String>) -> Self {
        Self::NoResponse {
            reason: reason.into(),
        }
    }
}

/// The only failure shape that crosses a backend operation boundary.
///
/// Serializes as `{"kind": "...", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{kind}: {}", payload_text(.payload))]
pub struct NormalizedError {
    /// Failure category.
    pub kind: ErrorKind,
    /// The server's error body, or a descriptive message.
    pub payload: Value,
    /// HTTP status for server errors.
    #[serde(skip)]
    pub status: Option<u16>,
}

impl NormalizedError {
    /// A server error carrying the response body.
    pub fn server(status: u16, payload: Value) -> Self {
        Self {
            kind: ErrorKind::ServerError,
            payload,
            status: Some(status),
        }
    }

    /// The fixed no-response error.
    pub fn no_response() -> Self {
        Self {
            kind: ErrorKind::NoResponse,
            payload: Value::String(NO_RESPONSE_MESSAGE.to_string()),
            status: None,
        }
    }

    /// A request setup error with a descriptive message.
    pub fn request_setup(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::RequestSetupError,
            payload: Value::String(message.into()),
            status: None,
        }
    }

    /// Failure category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Whether this is a 404 from the server.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::ServerError && self.status == Some(404)
    }

    /// Best human-readable text carried by the payload.
    ///
    /// A string payload is returned as-is; an object payload yields its
    /// `error`, `detail` or `message` field when that field is a string.
    pub fn message(&self) -> Option<&str> {
        match &self.payload {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => ["error", "detail", "message"]
                .iter()
                .find_map(|field| map.get(*field).and_then(Value::as_str)),
            _ => None,
        }
    }
}

fn payload_text(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode a server error body: JSON when it parses, otherwise the text.
pub fn decode_error_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Collapse a raw failure into a [`NormalizedError`], logging it.
///
/// Priority: a received response wins, then a missing response, then a setup
/// failure. Exactly one kind is produced for every input.
pub fn normalize(backend: &str, failure: TransportFailure) -> NormalizedError {
    match failure {
        TransportFailure::Status { status, body } => {
            let payload = decode_error_body(&body);
            error!(backend, status, payload = %payload, "Response error");
            NormalizedError::server(status, payload)
        }
        TransportFailure::NoResponse { reason } => {
            warn!(backend, reason = %reason, "Request error: no response");
            NormalizedError::no_response()
        }
        TransportFailure::Setup { message } => {
            error!(backend, message = %message, "Request setup error");
            NormalizedError::request_setup(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === Classification Tests ===

    #[test]
    fn test_status_failure_becomes_server_error() {
        let err = normalize(
            "processing",
            TransportFailure::Status {
                status: 500,
                body: br#"{"detail":"internal error"}"#.to_vec(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(err.payload, json!({"detail": "internal error"}));
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_server_error_keeps_non_json_body_as_text() {
        let err = normalize(
            "session",
            TransportFailure::Status {
                status: 403,
                body: b"CSRF verification failed".to_vec(),
            },
        );
        assert_eq!(err.payload, json!("CSRF verification failed"));
    }

    #[test]
    fn test_server_error_with_empty_body() {
        let err = normalize(
            "processing",
            TransportFailure::Status {
                status: 502,
                body: Vec::new(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(err.payload, Value::Null);
    }

    #[test]
    fn test_no_response_uses_fixed_message() {
        let err = normalize("processing", TransportFailure::no_response("connection refused"));
        assert_eq!(err.kind(), ErrorKind::NoResponse);
        assert_eq!(err.payload, json!(NO_RESPONSE_MESSAGE));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_setup_failure_keeps_message() {
        let err = normalize("processing", TransportFailure::setup("invalid header value"));
        assert_eq!(err.kind(), ErrorKind::RequestSetupError);
        assert_eq!(err.payload, json!("invalid header value"));
    }

    #[test]
    fn test_classification_is_backend_agnostic() {
        let failure = TransportFailure::Status {
            status: 404,
            body: br#"{"error":"Data not found"}"#.to_vec(),
        };
        assert_eq!(
            normalize("session", failure.clone()),
            normalize("processing", failure)
        );
    }

    // === Accessor Tests ===

    #[test]
    fn test_is_not_found() {
        assert!(NormalizedError::server(404, Value::Null).is_not_found());
        assert!(!NormalizedError::server(500, Value::Null).is_not_found());
        assert!(!NormalizedError::no_response().is_not_found());
    }

    #[test]
    fn test_message_from_object_payload() {
        let err = NormalizedError::server(404, json!({"error": "Data not found"}));
        assert_eq!(err.message(), Some("Data not found"));

        let err = NormalizedError::server(500, json!({"detail": "internal error"}));
        assert_eq!(err.message(), Some("internal error"));

        let err = NormalizedError::server(500, json!({"code": 7}));
        assert_eq!(err.message(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            NormalizedError::no_response().to_string(),
            "NoResponse: No response received from server"
        );
        assert_eq!(
            NormalizedError::server(500, json!({"detail": "x"})).to_string(),
            r#"ServerError: {"detail":"x"}"#
        );
    }

    // === Wire Shape Tests ===

    #[test]
    fn test_serializes_kind_and_payload_only() {
        let err = NormalizedError::server(500, json!({"detail": "internal error"}));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({"kind": "ServerError", "payload": {"detail": "internal error"}})
        );
    }
}
