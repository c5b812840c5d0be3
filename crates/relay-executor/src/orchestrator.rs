//! Cache-then-compute orchestration.

use std::sync::Arc;

use relay_api::{ApiEnvelope, CachedPayload, DataBackend, ProcessedPayload};
use relay_transport::NormalizedError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{FallbackPolicy, OrchestratorState, Source, StateObserver};

/// A successful orchestrator result.
///
/// Serializes as `{"source": "cache" | "processed", "envelope": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "envelope", rename_all = "lowercase")]
pub enum Resolved {
    /// Served from the cache.
    Cache(ApiEnvelope<CachedPayload>),
    /// Computed on demand after the cache lookup failed.
    Processed(ApiEnvelope<ProcessedPayload>),
}

impl Resolved {
    /// Where the result came from.
    pub fn source(&self) -> Source {
        match self {
            Self::Cache(_) => Source::Cache,
            Self::Processed(_) => Source::Processed,
        }
    }

    /// The soft error carried by the envelope, if any.
    pub fn soft_error(&self) -> Option<&str> {
        match self {
            Self::Cache(envelope) => envelope.soft_error(),
            Self::Processed(envelope) => envelope.soft_error(),
        }
    }
}

/// Runs the cache-then-compute policy for a key.
///
/// Holds no mutable state: one orchestrator can serve any number of
/// concurrent invocations.
pub struct FallbackOrchestrator<B> {
    backend: B,
    policy: FallbackPolicy,
    observer: Option<Arc<dyn StateObserver>>,
}

impl<B: DataBackend> FallbackOrchestrator<B> {
    /// Create an orchestrator with the default policy.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: FallbackPolicy::default(),
            observer: None,
        }
    }

    /// Set the fallback policy.
    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach a state observer.
    pub fn with_observer(mut self, observer: Arc<dyn StateObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The fallback policy in use.
    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Resolve a key: cache first, processing on lookup failure.
    ///
    /// The key doubles as the processing input. When both steps fail, the
    /// processing error is returned and the lookup error is dropped. An empty
    /// key is rejected before any request is made.
    pub async fn process_key(&self, key: &str) -> Result<Resolved, NormalizedError> {
        if key.is_empty() {
            return Err(NormalizedError::request_setup("key must be a non-empty string"));
        }

        let mut state = OrchestratorState::Idle;
        self.transition(key, &mut state, OrchestratorState::AwaitingCache);

        let cache_error = match self.backend.fetch_cached_data(key).await {
            Ok(envelope) => {
                self.transition(key, &mut state, OrchestratorState::Succeeded(Source::Cache));
                info!(key, source = %Source::Cache, "Resolved key");
                return Ok(Resolved::Cache(envelope));
            }
            Err(err) => err,
        };

        if !self.policy.should_fall_back(&cache_error) {
            debug!(key, policy = %self.policy, error = %cache_error, "Cache lookup failure is not a miss");
            self.transition(key, &mut state, OrchestratorState::Failed(cache_error.clone()));
            return Err(cache_error);
        }

        debug!(key, error = %cache_error, "Cache lookup failed, falling back to processing");
        self.transition(key, &mut state, OrchestratorState::AwaitingProcess);

        match self.backend.submit_for_processing(key).await {
            Ok(envelope) => {
                self.transition(key, &mut state, OrchestratorState::Succeeded(Source::Processed));
                info!(key, source = %Source::Processed, "Resolved key");
                Ok(Resolved::Processed(envelope))
            }
            Err(err) => {
                self.transition(key, &mut state, OrchestratorState::Failed(err.clone()));
                Err(err)
            }
        }
    }

    fn transition(&self, key: &str, state: &mut OrchestratorState, next: OrchestratorState) {
        debug_assert!(
            state.can_transition_to(&next),
            "illegal transition {} -> {}",
            state.name(),
            next.name()
        );
        debug!(key, from = state.name(), to = next.name(), "State transition");

        *state = next;
        if let Some(observer) = &self.observer {
            observer.on_transition(key, state);
        }
    }
}
