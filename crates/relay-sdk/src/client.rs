//! High-level client wiring both backends together.

use std::sync::Arc;

use relay_api::{HealthStatus, ProcessingApi, SessionApi};
use relay_executor::{FallbackOrchestrator, FallbackPolicy, Resolved, StateObserver};
use relay_transport::{BackendEndpoint, FetchClient, NormalizedError};
use tracing::debug;

use crate::RelayConfig;

/// Client for the session and processing backends.
///
/// Each client owns its own transport handles; build as many as needed with
/// different endpoints.
pub struct RelayClient {
    session: SessionApi,
    orchestrator: FallbackOrchestrator<ProcessingApi>,
}

impl RelayClient {
    /// Create a client from explicit endpoints, using the default policy.
    pub fn new(
        session: BackendEndpoint,
        processing: BackendEndpoint,
    ) -> Result<Self, NormalizedError> {
        debug!(
            session = session.base_url(),
            processing = processing.base_url(),
            "Creating relay client"
        );
        let session = SessionApi::new(FetchClient::new(session)?);
        let processing = ProcessingApi::new(FetchClient::new(processing)?);
        Ok(Self {
            session,
            orchestrator: FallbackOrchestrator::new(processing),
        })
    }

    /// Create a client from configuration.
    ///
    /// The configuration is validated first; an invalid one is a setup error.
    pub fn from_config(config: &RelayConfig) -> Result<Self, NormalizedError> {
        config
            .validate()
            .map_err(|err| NormalizedError::request_setup(err.to_string()))?;
        Ok(Self::new(config.session_endpoint(), config.processing_endpoint())?
            .with_policy(config.fallback))
    }

    /// Set the fallback policy.
    pub fn with_policy(self, policy: FallbackPolicy) -> Self {
        Self {
            orchestrator: self.orchestrator.with_policy(policy),
            ..self
        }
    }

    /// Attach a state observer to the orchestrator.
    pub fn with_observer(self, observer: Arc<dyn StateObserver>) -> Self {
        Self {
            orchestrator: self.orchestrator.with_observer(observer),
            ..self
        }
    }

    /// Resolve a key through the cache with processing fallback.
    pub async fn process_key(&self, key: &str) -> Result<Resolved, NormalizedError> {
        self.orchestrator.process_key(key).await
    }

    /// Fetch the session anti-forgery token.
    pub async fn session_token(&self) -> Result<String, NormalizedError> {
        self.session.fetch_session_token().await
    }

    /// Probe the processing service.
    pub async fn health(&self) -> Result<HealthStatus, NormalizedError> {
        self.processing().health().await
    }

    /// The session backend API.
    pub fn session(&self) -> &SessionApi {
        &self.session
    }

    /// The processing backend API, for direct cache or processing calls.
    pub fn processing(&self) -> &ProcessingApi {
        self.orchestrator.backend()
    }

    /// The fallback policy in use.
    pub fn policy(&self) -> FallbackPolicy {
        self.orchestrator.policy()
    }
}
