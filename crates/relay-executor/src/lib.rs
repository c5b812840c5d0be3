//! Cache-then-compute fallback orchestration.
//!
//! This crate provides:
//! - `FallbackOrchestrator` - Cache lookup with on-demand processing fallback
//! - `FallbackPolicy` - Which lookup failures trigger the fallback
//! - `OrchestratorState` - Per-invocation state machine
//! - `StateObserver` - Transition hook for progress reporting

mod fallback;
mod orchestrator;
mod state;

pub use fallback::*;
pub use orchestrator::*;
pub use state::*;
