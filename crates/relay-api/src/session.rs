//! Session backend operations.

use relay_transport::{FetchClient, NormalizedError, Response};
use serde_json::Value;
use tracing::debug;

/// Path of the CSRF token endpoint, relative to the session API root.
pub const CSRF_TOKEN_PATH: &str = "/csrf-token/";

/// Operations against the session backend.
#[derive(Debug, Clone)]
pub struct SessionApi {
    client: FetchClient,
}

impl SessionApi {
    /// Wrap a client bound to the session endpoint.
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    /// Fetch a CSRF token.
    ///
    /// `GET /csrf-token/`; returns the token carried by the body.
    pub async fn fetch_session_token(&self) -> Result<String, NormalizedError> {
        let response = self.client.get(CSRF_TOKEN_PATH).send().await?;
        let token = token_from_body(&response);

        debug!(token_len = token.len(), "Fetched session token");
        Ok(token)
    }
}

/// Extract the token from a JSON string or a token-bearing object.
///
/// Any other body is returned as trimmed text.
fn token_from_body(response: &Response) -> String {
    let token = match serde_json::from_slice::<Value>(response.bytes()) {
        Ok(Value::String(token)) => Some(token),
        Ok(Value::Object(map)) => ["csrfToken", "csrf_token", "token"]
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    };
    token.unwrap_or_else(|| response.text().trim().to_string())
}
