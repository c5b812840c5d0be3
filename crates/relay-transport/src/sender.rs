//! The network seam and its `reqwest` implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::{BackendEndpoint, RequestBuilder, Response, TransportFailure};

/// Sends one fully built request and returns whatever came back.
///
/// Implementations report a received response as `Ok`, whatever its status;
/// status handling belongs to the client.
#[async_trait]
pub trait HttpSend: Send + Sync {
    /// Perform one network round trip.
    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportFailure>;
}

/// `reqwest`-backed sender bound to one endpoint's credential policy and timeout.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: reqwest::Client,
}

impl ReqwestSender {
    /// Build the underlying client for an endpoint.
    pub fn new(endpoint: &BackendEndpoint) -> Result<Self, TransportFailure> {
        // Credentials are cookies: only an including endpoint keeps a store.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(endpoint.timeout_ms()))
            .cookie_store(endpoint.credentials().includes_credentials())
            .build()
            .map_err(|e| TransportFailure::setup(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            backend = endpoint.name(),
            base_url = endpoint.base_url(),
            credentials = ?endpoint.credentials(),
            timeout_ms = endpoint.timeout_ms(),
            "Created HTTP client"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSend for ReqwestSender {
    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportFailure> {
        let mut builder = self.client.request(request.method.into(), request.url.as_str());
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportFailure::no_response(e.to_string()))?
            .to_vec();

        Ok(Response::new(status, headers, body))
    }
}

/// Map a `reqwest` send error to a raw failure.
///
/// Builder errors never left the client; everything else was dispatched.
pub fn classify(err: reqwest::Error) -> TransportFailure {
    if err.is_builder() {
        TransportFailure::setup(err.to_string())
    } else {
        TransportFailure::no_response(err.to_string())
    }
}
