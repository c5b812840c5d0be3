//! Processing backend response envelope.

use relay_transport::Response;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A processing backend response.
///
/// The backend may report an application-level error inside a 2xx response.
/// That case is its own variant so it cannot be mistaken for a payload.
///
/// On the wire this is `{"data": T, "error"?: string}`; a string `error`
/// always decodes to [`ApiEnvelope::SoftError`]. A body without either field
/// is read as the bare payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEnvelope<T> {
    /// The backend returned a payload.
    Ok(T),
    /// The transport succeeded but the backend reported an error.
    SoftError(String),
}

impl<T> ApiEnvelope<T> {
    /// The payload, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ok(data) => Some(data),
            Self::SoftError(_) => None,
        }
    }

    /// The soft error message, if any.
    pub fn soft_error(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::SoftError(message) => Some(message),
        }
    }

    /// Whether the envelope carries a payload.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Convert into a `Result`.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Ok(data) => Ok(data),
            Self::SoftError(message) => Err(message),
        }
    }
}

/// Prefix of the soft error reported for an unreadable 2xx body.
pub const MALFORMED_BODY_MESSAGE: &str = "Malformed response body";

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// Decode a successful response.
    ///
    /// The status already says the call succeeded, so a body that matches no
    /// known shape becomes a [`ApiEnvelope::SoftError`] rather than a failure.
    pub fn from_response(response: &Response) -> Self {
        match response.json::<Self>() {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(status = response.status, error = %err, "Unreadable response body");
                Self::SoftError(format!("{}: {}", MALFORMED_BODY_MESSAGE, err))
            }
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ApiEnvelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = Value::deserialize(deserializer)?;
        if let Some(map) = value.as_object_mut() {
            if let Some(Value::String(message)) = map.remove("error") {
                return Ok(Self::SoftError(message));
            }
            if let Some(data) = map.remove("data") {
                return T::deserialize(data).map(Self::Ok).map_err(de::Error::custom);
            }
        }
        // The processing service also answers with the bare payload.
        T::deserialize(value).map(Self::Ok).map_err(de::Error::custom)
    }
}

impl<T: Serialize> Serialize for ApiEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Ok(data) => map.serialize_entry("data", data)?,
            Self::SoftError(message) => map.serialize_entry("error", message)?,
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CachedPayload, ProcessedPayload};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_decodes_payload() {
        let envelope: ApiEnvelope<CachedPayload> =
            serde_json::from_value(json!({"data": {"data": "hello"}})).unwrap();
        assert_eq!(envelope, ApiEnvelope::Ok(CachedPayload::new("hello")));
        assert!(envelope.is_ok());
    }

    #[test]
    fn test_error_field_wins_over_data() {
        let envelope: ApiEnvelope<ProcessedPayload> = serde_json::from_value(json!({
            "data": {"processed": false, "input": "x"},
            "error": "quota exceeded"
        }))
        .unwrap();
        assert_eq!(envelope.soft_error(), Some("quota exceeded"));
        assert_eq!(envelope.data(), None);
    }

    #[test]
    fn test_error_without_data() {
        let envelope: ApiEnvelope<CachedPayload> =
            serde_json::from_value(json!({"error": "Data not found"})).unwrap();
        assert_eq!(envelope, ApiEnvelope::SoftError("Data not found".to_string()));
    }

    #[test]
    fn test_null_error_is_ignored() {
        let envelope: ApiEnvelope<CachedPayload> =
            serde_json::from_value(json!({"data": {"data": "v"}, "error": null})).unwrap();
        assert!(envelope.is_ok());
    }

    #[test]
    fn test_missing_data_and_error_is_rejected() {
        let result: Result<ApiEnvelope<CachedPayload>, _> = serde_json::from_value(json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn test_string_data_is_cached_payload() {
        let envelope: ApiEnvelope<CachedPayload> =
            serde_json::from_value(json!({"data": "hello"})).unwrap();
        assert_eq!(envelope, ApiEnvelope::Ok(CachedPayload::new("hello")));
    }

    #[test]
    fn test_bare_payload_is_ok() {
        let envelope: ApiEnvelope<ProcessedPayload> =
            serde_json::from_value(json!({"processed": true, "input": "abc123"})).unwrap();
        assert_eq!(envelope, ApiEnvelope::Ok(ProcessedPayload::new("abc123")));
    }

    // === from_response Tests ===

    fn ok_response(body: &[u8]) -> Response {
        Response::new(200, HashMap::new(), body.to_vec())
    }

    #[test]
    fn test_from_response_decodes_wrapped_and_bare_bodies() {
        let cached: ApiEnvelope<CachedPayload> =
            ApiEnvelope::from_response(&ok_response(br#"{"data":"hello"}"#));
        assert_eq!(cached, ApiEnvelope::Ok(CachedPayload::new("hello")));

        let processed: ApiEnvelope<ProcessedPayload> =
            ApiEnvelope::from_response(&ok_response(br#"{"processed":true,"input":"abc123"}"#));
        assert_eq!(processed, ApiEnvelope::Ok(ProcessedPayload::new("abc123")));
    }

    #[test]
    fn test_from_response_unreadable_body_is_soft_error() {
        let envelope: ApiEnvelope<CachedPayload> =
            ApiEnvelope::from_response(&ok_response(b"<html>oops</html>"));
        let message = envelope.soft_error().unwrap();
        assert!(message.starts_with(MALFORMED_BODY_MESSAGE));

        let envelope: ApiEnvelope<ProcessedPayload> =
            ApiEnvelope::from_response(&ok_response(br#"{"unexpected":1}"#));
        assert!(!envelope.is_ok());
    }

    #[test]
    fn test_serializes_wire_shape() {
        let ok = ApiEnvelope::Ok(ProcessedPayload::new("missing-key"));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"data": {"processed": true, "input": "missing-key"}})
        );

        let soft: ApiEnvelope<ProcessedPayload> = ApiEnvelope::SoftError("nope".into());
        assert_eq!(serde_json::to_value(&soft).unwrap(), json!({"error": "nope"}));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ApiEnvelope::Ok(1).into_result(), Ok(1));
        assert_eq!(
            ApiEnvelope::<i32>::SoftError("e".into()).into_result(),
            Err("e".to_string())
        );
    }
}
