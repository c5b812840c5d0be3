//! Typed operations against the session and processing backends.
//!
//! This crate provides:
//! - `SessionApi` - CSRF token retrieval from the session backend
//! - `ProcessingApi` - Cache lookup, on-demand processing and health checks
//! - `DataBackend` - The cache/process seam the fallback orchestrator uses
//! - `ApiEnvelope` - The processing backend's response wrapper
//!
//! Every operation fails only with a
//! [`NormalizedError`](relay_transport::NormalizedError).

mod envelope;
mod models;
mod processing;
mod session;

pub use envelope::*;
pub use models::*;
pub use processing::*;
pub use session::*;
