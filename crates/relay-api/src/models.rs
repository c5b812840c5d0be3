//! Processing backend payloads.

use relay_transport::Response;
use serde::{Deserialize, Deserializer, Serialize};

/// Value stored under a key in the processing service's cache.
///
/// Decodes from `{"data": "..."}` or from the bare string the service stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedPayload {
    pub data: String,
}

impl<'de> Deserialize<'de> for CachedPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Bare(String),
            Wrapped { data: String },
        }

        match Wire::deserialize(deserializer)? {
            Wire::Bare(data) | Wire::Wrapped { data } => Ok(Self { data }),
        }
    }
}

impl CachedPayload {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

/// Result of an on-demand processing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedPayload {
    pub processed: bool,
    pub input: String,
}

impl ProcessedPayload {
    /// A successfully processed input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            processed: true,
            input: input.into(),
        }
    }
}

/// Body of `POST /process-data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub input: String,
}

/// Processing service health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    /// Read a health report from a successful response.
    ///
    /// A body that is not `{"status": ...}` is taken as the status text itself.
    pub fn from_response(response: &Response) -> Self {
        response.json().unwrap_or_else(|_| {
            let text = response.text();
            let status = match text.trim() {
                "" => "unknown",
                status => status,
            };
            Self {
                status: status.to_string(),
            }
        })
    }
}
