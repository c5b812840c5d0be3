//! HTTP request builder.

use std::collections::HashMap;

use serde::Serialize;

use crate::TransportFailure;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A fully resolved request, ready for an [`HttpSend`](crate::HttpSend).
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) setup_error: Option<String>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            setup_error: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add multiple headers to the request.
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set the request body as JSON.
    ///
    /// Serialization failures are kept and reported when the request is sent.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(json) => {
                self.headers
                    .insert("Content-Type".to_string(), "application/json".to_string());
                self.body = Some(json);
            }
            Err(e) => {
                self.setup_error = Some(format!("Failed to serialize request body: {}", e));
            }
        }
        self
    }

    /// The HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The absolute request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get a header value (case-insensitive).
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The request body, if any.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Fail if an earlier builder step could not complete.
    pub fn check(&self) -> Result<(), TransportFailure> {
        match &self.setup_error {
            Some(message) => Err(TransportFailure::setup(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
    }

    #[test]
    fn test_json_sets_body_and_content_type() {
        let req = RequestBuilder::new(Method::Post, "http://localhost/process-data")
            .json(&serde_json::json!({"input": "abc"}));
        assert_eq!(req.body_bytes(), Some(br#"{"input":"abc"}"#.as_slice()));
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert!(req.check().is_ok());
    }

    #[test]
    fn test_json_failure_is_deferred_to_check() {
        let req = RequestBuilder::new(Method::Post, "http://localhost/x").json(&Unserializable);
        assert!(req.body_bytes().is_none());
        match req.check() {
            Err(TransportFailure::Setup { message }) => {
                assert!(message.contains("refusing to serialize"))
            }
            other => panic!("expected setup failure, got {:?}", other),
        }
    }

    #[test]
    fn test_header_value_case_insensitive() {
        let req = RequestBuilder::new(Method::Get, "http://localhost/")
            .header("X-Request-Id", "abc");
        assert_eq!(req.header_value("x-request-id"), Some("abc"));
        assert_eq!(req.header_value("X-Missing"), None);
    }
}
