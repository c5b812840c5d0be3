//! Per-backend HTTP transport for the relay client.
//!
//! Each backend gets one [`BackendEndpoint`] and one [`FetchClient`] bound to
//! it. Every request sent through a client is resolved against the
//! endpoint's base address, carries its default headers and credential
//! policy, and on failure is passed through [`normalize`], so the only error
//! a caller ever sees is a [`NormalizedError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use relay_transport::{BackendEndpoint, FetchClient};
//!
//! let client = FetchClient::new(BackendEndpoint::processing(
//!     "http://localhost:8080/api/v1",
//! ))?;
//!
//! let response = client
//!     .post("/process-data")
//!     .json(&serde_json::json!({ "input": "abc" }))
//!     .send()
//!     .await?;
//! let body: serde_json::Value = response.json()?;
//! ```

mod endpoint;
mod normalize;
mod request;
mod response;
mod sender;

use std::sync::Arc;

use tracing::debug;

pub use endpoint::{
    encode_path_segment, BackendEndpoint, CredentialPolicy, DEFAULT_PROCESSING_URL,
    DEFAULT_SESSION_URL, DEFAULT_TIMEOUT_MS,
};
pub use normalize::{
    decode_error_body, normalize, ErrorKind, NormalizedError, TransportFailure,
    NO_RESPONSE_MESSAGE,
};
pub use request::{Method, RequestBuilder};
pub use response::Response;
pub use sender::{classify, HttpSend, ReqwestSender};

/// HTTP client bound to one backend endpoint.
///
/// Cheap to clone; clones share the endpoint and the underlying sender.
#[derive(Clone)]
pub struct FetchClient {
    endpoint: Arc<BackendEndpoint>,
    sender: Arc<dyn HttpSend>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl FetchClient {
    /// Create a client backed by `reqwest`.
    ///
    /// Failing to build the HTTP client is a request setup error.
    pub fn new(endpoint: BackendEndpoint) -> Result<Self, NormalizedError> {
        let sender =
            ReqwestSender::new(&endpoint).map_err(|f| normalize(endpoint.name(), f))?;
        Ok(Self::with_sender(endpoint, Arc::new(sender)))
    }

    /// Create a client with an explicit sender.
    pub fn with_sender(endpoint: BackendEndpoint, sender: Arc<dyn HttpSend>) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            sender,
        }
    }

    /// The endpoint this client is bound to.
    pub fn endpoint(&self) -> &BackendEndpoint {
        &self.endpoint
    }

    /// Create a GET request.
    pub fn get(&self, path: &str) -> ClientRequestBuilder {
        self.request(Method::Get, path)
    }

    /// Create a POST request.
    pub fn post(&self, path: &str) -> ClientRequestBuilder {
        self.request(Method::Post, path)
    }

    /// Create a request with the endpoint's base address and default headers.
    pub fn request(&self, method: Method, path: &str) -> ClientRequestBuilder {
        let url = self.endpoint.url_for(path);
        let builder = RequestBuilder::new(method, url).headers(
            self.endpoint
                .default_headers()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        ClientRequestBuilder {
            client: self.clone(),
            builder,
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    client: FetchClient,
    builder: RequestBuilder,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Send the request; any non-2xx response or transport failure is normalized.
    pub async fn send(self) -> Result<Response, NormalizedError> {
        let backend = self.client.endpoint.name().to_string();
        self.dispatch()
            .await
            .map_err(|failure| normalize(&backend, failure))
    }

    async fn dispatch(self) -> Result<Response, TransportFailure> {
        self.builder.check()?;

        debug!(
            backend = self.client.endpoint.name(),
            method = self.builder.method().as_str(),
            url = self.builder.url(),
            "Sending request"
        );

        let response = self.client.sender.send(self.builder).await?;

        debug!(
            backend = self.client.endpoint.name(),
            status = response.status,
            content_type = ?response.header("content-type"),
            "Received response"
        );

        response.error_for_status()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BackendEndpoint, CredentialPolicy, ErrorKind, FetchClient, HttpSend, Method,
        NormalizedError, Response,
    };
}
