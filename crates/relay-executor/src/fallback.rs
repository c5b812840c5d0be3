//! Fallback policies for cache lookup failures.

use std::fmt;
use std::str::FromStr;

use relay_transport::NormalizedError;
use serde::{Deserialize, Serialize};

/// Which cache lookup failures trigger on-demand processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Any failure falls back, whatever its kind.
    ///
    /// A network blip on the lookup is indistinguishable from a miss here.
    #[default]
    AnyFailure,

    /// Only a confirmed miss (a 404 from the server) falls back; any other
    /// lookup failure is surfaced as-is.
    ConfirmedMissOnly,
}

impl FallbackPolicy {
    /// Whether this cache lookup failure should trigger processing.
    pub fn should_fall_back(&self, error: &NormalizedError) -> bool {
        match self {
            Self::AnyFailure => true,
            Self::ConfirmedMissOnly => error.is_not_found(),
        }
    }

    /// Policy name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnyFailure => "any-failure",
            Self::ConfirmedMissOnly => "confirmed-miss-only",
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an unrecognized policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fallback policy '{0}' (expected any-failure or confirmed-miss-only)")]
pub struct UnknownPolicy(pub String);

impl FromStr for FallbackPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any-failure" => Ok(Self::AnyFailure),
            "confirmed-miss-only" => Ok(Self::ConfirmedMissOnly),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}
