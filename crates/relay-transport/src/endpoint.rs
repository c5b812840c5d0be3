//! Backend endpoint configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default base address of the session backend.
pub const DEFAULT_SESSION_URL: &str = "http://localhost:8000/api";

/// Default base address of the processing backend.
pub const DEFAULT_PROCESSING_URL: &str = "http://localhost:8080/api/v1";

/// Transport default timeout applied to every call.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Whether cookies and other credentials travel with requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialPolicy {
    /// Send and store credentials (cookies).
    Include,
    /// Never attach credentials.
    #[default]
    Omit,
}

impl CredentialPolicy {
    /// Whether credentials are attached.
    pub fn includes_credentials(&self) -> bool {
        matches!(self, Self::Include)
    }
}

/// Connection parameters for one backend.
///
/// An endpoint is built once and never mutated afterwards; every request sent
/// through a [`FetchClient`](crate::FetchClient) bound to it gets the same base
/// address, default headers and credential policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    name: String,
    base_url: String,
    default_headers: HashMap<String, String>,
    credentials: CredentialPolicy,
    timeout_ms: u64,
}

impl BackendEndpoint {
    /// Create an endpoint with JSON headers and credentials omitted.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            name: name.into(),
            base_url: base_url.into(),
            default_headers,
            credentials: CredentialPolicy::Omit,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// The session backend: credentials included.
    pub fn session(base_url: impl Into<String>) -> Self {
        Self::new("session", base_url).with_credentials(CredentialPolicy::Include)
    }

    /// The processing backend: credentials omitted.
    pub fn processing(base_url: impl Into<String>) -> Self {
        Self::new("processing", base_url).with_credentials(CredentialPolicy::Omit)
    }

    /// Add a default header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the credential policy.
    pub fn with_credentials(mut self, credentials: CredentialPolicy) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the transport timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Backend name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base address prefixed to every relative path.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers attached to every request.
    pub fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Credential policy.
    pub fn credentials(&self) -> CredentialPolicy {
        self.credentials
    }

    /// Transport timeout in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Resolve a path against the base address.
    ///
    /// Absolute `http://` and `https://` URLs are returned untouched.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Scheme, host and port of the base address, without any path.
    pub fn origin(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.base_url).ok()?;
        let origin = url.origin();
        origin.is_tuple().then(|| origin.ascii_serialization())
    }
}

/// Percent-encode a value for use as a single URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_endpoint_includes_credentials() {
        let endpoint = BackendEndpoint::session(DEFAULT_SESSION_URL);
        assert_eq!(endpoint.name(), "session");
        assert_eq!(endpoint.credentials(), CredentialPolicy::Include);
        assert_eq!(
            endpoint.default_headers().get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_processing_endpoint_omits_credentials() {
        let endpoint = BackendEndpoint::processing(DEFAULT_PROCESSING_URL);
        assert_eq!(endpoint.name(), "processing");
        assert!(!endpoint.credentials().includes_credentials());
        assert_eq!(endpoint.timeout_ms(), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_url_for_joins_base_and_path() {
        let endpoint = BackendEndpoint::processing("http://localhost:8080/api/v1/");
        assert_eq!(
            endpoint.url_for("/process-data"),
            "http://localhost:8080/api/v1/process-data"
        );
    }

    #[test]
    fn test_url_for_keeps_absolute_urls() {
        let endpoint = BackendEndpoint::processing(DEFAULT_PROCESSING_URL);
        assert_eq!(
            endpoint.url_for("https://elsewhere.test/health"),
            "https://elsewhere.test/health"
        );
    }

    #[test]
    fn test_origin_strips_path() {
        let endpoint = BackendEndpoint::processing("http://localhost:8080/api/v1");
        assert_eq!(endpoint.origin().as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_origin_of_relative_base_is_none() {
        let endpoint = BackendEndpoint::session("/api");
        assert_eq!(endpoint.origin(), None);
    }

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("abc123"), "abc123");
        assert_eq!(encode_path_segment("missing-key"), "missing-key");
        assert_eq!(encode_path_segment("a b/c?d"), "a%20b%2Fc%3Fd");
        assert_eq!(encode_path_segment("é"), "%C3%A9");
    }
}
