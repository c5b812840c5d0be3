//! Processing backend operations.

use async_trait::async_trait;
use relay_transport::{
    encode_path_segment, normalize, FetchClient, NormalizedError, TransportFailure,
};
use tracing::debug;

use crate::{ApiEnvelope, CachedPayload, HealthStatus, ProcessRequest, ProcessedPayload};

/// Path of the processing endpoint.
pub const PROCESS_DATA_PATH: &str = "/process-data";

/// Path of the health endpoint, relative to the service root.
pub const HEALTH_PATH: &str = "/health";

/// Path of the cache lookup endpoint for a key.
pub fn cached_data_path(key: &str) -> String {
    format!("/cached-data/{}", encode_path_segment(key))
}

/// The two processing operations the fallback policy is built on.
#[async_trait]
pub trait DataBackend: Send + Sync {
    /// Look up a cached value by key.
    async fn fetch_cached_data(
        &self,
        key: &str,
    ) -> Result<ApiEnvelope<CachedPayload>, NormalizedError>;

    /// Process an input on demand.
    async fn submit_for_processing(
        &self,
        input: &str,
    ) -> Result<ApiEnvelope<ProcessedPayload>, NormalizedError>;
}

/// Operations against the processing backend.
#[derive(Debug, Clone)]
pub struct ProcessingApi {
    client: FetchClient,
}

impl ProcessingApi {
    /// Wrap a client bound to the processing endpoint.
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    /// Check the processing service's health.
    ///
    /// `GET /health` on the service root rather than the API base.
    pub async fn health(&self) -> Result<HealthStatus, NormalizedError> {
        let endpoint = self.client.endpoint();
        let url = match endpoint.origin() {
            Some(origin) => format!("{}{}", origin, HEALTH_PATH),
            None => HEALTH_PATH.to_string(),
        };
        let response = self.client.get(&url).send().await?;
        Ok(HealthStatus::from_response(&response))
    }
}

#[async_trait]
impl DataBackend for ProcessingApi {
    async fn fetch_cached_data(
        &self,
        key: &str,
    ) -> Result<ApiEnvelope<CachedPayload>, NormalizedError> {
        if key.is_empty() {
            return Err(normalize(
                self.client.endpoint().name(),
                TransportFailure::setup("key must be a non-empty string"),
            ));
        }

        debug!(key, "Fetching cached data");
        let response = self.client.get(&cached_data_path(key)).send().await?;
        Ok(ApiEnvelope::from_response(&response))
    }

    async fn submit_for_processing(
        &self,
        input: &str,
    ) -> Result<ApiEnvelope<ProcessedPayload>, NormalizedError> {
        let body = ProcessRequest {
            input: input.to_string(),
        };

        debug!(input, "Submitting data for processing");
        let response = self.client.post(PROCESS_DATA_PATH).json(&body).send().await?;
        Ok(ApiEnvelope::from_response(&response))
    }
}
