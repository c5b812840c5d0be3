//! Orchestrator state tracking.

use std::fmt;

use relay_transport::{ErrorKind, NormalizedError};
use serde::{Deserialize, Serialize};

/// Where a successful result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The cache lookup succeeded.
    Cache,
    /// The cache lookup failed and processing succeeded.
    Processed,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Processed => "processed",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States of one orchestrator invocation.
///
/// `Idle -> AwaitingCache -> (Succeeded(Cache) | AwaitingProcess)`, then
/// `AwaitingProcess -> (Succeeded(Processed) | Failed)`. With
/// [`FallbackPolicy::ConfirmedMissOnly`](crate::FallbackPolicy) a lookup
/// failure that is not a miss goes straight from `AwaitingCache` to `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorState {
    Idle,
    AwaitingCache,
    AwaitingProcess,
    Succeeded(Source),
    Failed(NormalizedError),
}

impl OrchestratorState {
    /// Whether no further transition can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: &OrchestratorState) -> bool {
        use OrchestratorState::*;
        matches!(
            (self, next),
            (Idle, AwaitingCache)
                | (AwaitingCache, Succeeded(Source::Cache))
                | (AwaitingCache, AwaitingProcess)
                | (AwaitingCache, Failed(_))
                | (AwaitingProcess, Succeeded(Source::Processed))
                | (AwaitingProcess, Failed(_))
        )
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingCache => "awaiting_cache",
            Self::AwaitingProcess => "awaiting_process",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }

    /// Kind of the failure, for a failed state.
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Observer for state transitions.
pub trait StateObserver: Send + Sync {
    /// Called after each transition, with the state just entered.
    fn on_transition(&self, key: &str, state: &OrchestratorState);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!OrchestratorState::Idle.is_terminal());
        assert!(!OrchestratorState::AwaitingCache.is_terminal());
        assert!(!OrchestratorState::AwaitingProcess.is_terminal());
        assert!(OrchestratorState::Succeeded(Source::Cache).is_terminal());
        assert!(OrchestratorState::Failed(NormalizedError::no_response()).is_terminal());
    }

    #[test]
    fn test_legal_transitions() {
        use OrchestratorState::*;
        assert!(Idle.can_transition_to(&AwaitingCache));
        assert!(AwaitingCache.can_transition_to(&Succeeded(Source::Cache)));
        assert!(AwaitingCache.can_transition_to(&AwaitingProcess));
        assert!(AwaitingProcess.can_transition_to(&Succeeded(Source::Processed)));
        assert!(AwaitingProcess.can_transition_to(&Failed(NormalizedError::no_response())));
    }

    #[test]
    fn test_illegal_transitions() {
        use OrchestratorState::*;
        assert!(!Idle.can_transition_to(&AwaitingProcess));
        assert!(!AwaitingCache.can_transition_to(&Succeeded(Source::Processed)));
        assert!(!AwaitingProcess.can_transition_to(&Succeeded(Source::Cache)));
        assert!(!Succeeded(Source::Cache).can_transition_to(&AwaitingProcess));
    }

    #[test]
    fn test_failure_kind() {
        assert_eq!(
            OrchestratorState::Failed(NormalizedError::no_response()).failure_kind(),
            Some(ErrorKind::NoResponse)
        );
        assert_eq!(OrchestratorState::Idle.failure_kind(), None);
    }
}
