//! Client configuration.

use std::collections::HashMap;
use std::path::Path;

use relay_executor::FallbackPolicy;
use relay_transport::{
    BackendEndpoint, DEFAULT_PROCESSING_URL, DEFAULT_SESSION_URL, DEFAULT_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the session base address.
pub const ENV_SESSION_URL: &str = "RELAY_SESSION_URL";
/// Environment variable overriding the processing base address.
pub const ENV_PROCESSING_URL: &str = "RELAY_PROCESSING_URL";
/// Environment variable overriding the fallback policy.
pub const ENV_FALLBACK: &str = "RELAY_FALLBACK";

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the file.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the file.
    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    /// Failed to serialize the configuration.
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// An environment override has an unusable value.
    #[error("Invalid value for {var}: {message}")]
    InvalidEnv { var: String, message: String },

    /// The configuration is structurally valid but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Connection settings for one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base address; the backend's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Transport timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra headers sent with every request.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl EndpointConfig {
    /// Settings with a fixed base address.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            headers: HashMap::new(),
        }
    }

    fn apply(&self, mut endpoint: BackendEndpoint) -> BackendEndpoint {
        endpoint = endpoint.with_timeout_ms(self.timeout_ms);
        for (key, value) in &self.headers {
            endpoint = endpoint.with_header(key.clone(), value.clone());
        }
        endpoint
    }
}

/// Configuration for both backends and the fallback policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Policy for cache lookup failures.
    #[serde(default)]
    pub fallback: FallbackPolicy,

    /// Session backend settings.
    #[serde(default = "EndpointConfig::default_with_timeout")]
    pub session: EndpointConfig,

    /// Processing backend settings.
    #[serde(default = "EndpointConfig::default_with_timeout")]
    pub processing: EndpointConfig,
}

impl EndpointConfig {
    fn default_with_timeout() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            ..Self::default()
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::default(),
            session: EndpointConfig::default_with_timeout(),
            processing: EndpointConfig::default_with_timeout(),
        }
    }
}

impl RelayConfig {
    /// Load config from a file; `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content).map_err(|message| ConfigError::Parse {
                path: display,
                message,
            })
        } else {
            Self::from_toml(&content).map_err(|message| ConfigError::Parse {
                path: display,
                message,
            })
        }
    }

    fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Parse TOML text.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        Self::from_toml(content).map_err(|message| ConfigError::Parse {
            path: "<inline>".to_string(),
            message,
        })
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Apply `RELAY_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable lookup.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_SESSION_URL) {
            self.session.base_url = Some(url);
        }
        if let Some(url) = lookup(ENV_PROCESSING_URL) {
            self.processing.base_url = Some(url);
        }
        if let Some(policy) = lookup(ENV_FALLBACK) {
            self.fallback = policy.parse().map_err(|e: relay_executor::UnknownPolicy| {
                ConfigError::InvalidEnv {
                    var: ENV_FALLBACK.to_string(),
                    message: e.to_string(),
                }
            })?;
        }
        Ok(())
    }

    /// The session backend endpoint.
    pub fn session_endpoint(&self) -> BackendEndpoint {
        let base = self
            .session
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SESSION_URL.to_string());
        self.session.apply(BackendEndpoint::session(base))
    }

    /// The processing backend endpoint.
    pub fn processing_endpoint(&self) -> BackendEndpoint {
        let base = self
            .processing
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_PROCESSING_URL.to_string());
        self.processing.apply(BackendEndpoint::processing(base))
    }

    /// Check that both base addresses are absolute HTTP(S) URLs and timeouts are set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (endpoint, config) in [
            (self.session_endpoint(), &self.session),
            (self.processing_endpoint(), &self.processing),
        ] {
            if endpoint.origin().is_none() {
                return Err(ConfigError::Invalid(format!(
                    "{}.base_url '{}' is not an absolute http(s) URL",
                    endpoint.name(),
                    endpoint.base_url()
                )));
            }
            if config.timeout_ms == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{}.timeout_ms must be greater than zero",
                    endpoint.name()
                )));
            }
        }
        Ok(())
    }
}

/// Generate a default relay.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Relay client configuration

# Which cache lookup failures fall back to processing:
# "any-failure" or "confirmed-miss-only"
fallback = "any-failure"

[session]
base_url = "{session}"
timeout_ms = {timeout}

[processing]
base_url = "{processing}"
timeout_ms = {timeout}
"#,
        session = DEFAULT_SESSION_URL,
        processing = DEFAULT_PROCESSING_URL,
        timeout = DEFAULT_TIMEOUT_MS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_transport::CredentialPolicy;

    // === Parsing Tests ===

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = RelayConfig::parse_toml("").unwrap();
        assert_eq!(config, RelayConfig::default());
        assert_eq!(config.session_endpoint().base_url(), DEFAULT_SESSION_URL);
        assert_eq!(config.processing_endpoint().base_url(), DEFAULT_PROCESSING_URL);
        assert_eq!(config.processing_endpoint().timeout_ms(), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_partial_section_keeps_default_address() {
        let config = RelayConfig::parse_toml("[processing]\ntimeout_ms = 250\n").unwrap();
        let endpoint = config.processing_endpoint();
        assert_eq!(endpoint.base_url(), DEFAULT_PROCESSING_URL);
        assert_eq!(endpoint.timeout_ms(), 250);
    }

    #[test]
    fn test_generated_config_parses() {
        let config = RelayConfig::parse_toml(&generate_default_config()).unwrap();
        assert_eq!(config.fallback, FallbackPolicy::AnyFailure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fallback_and_headers() {
        let config = RelayConfig::parse_toml(
            r#"
fallback = "confirmed-miss-only"

[processing]
base_url = "http://processing.internal:8080/api/v1"

[processing.headers]
X-Client = "relay"
"#,
        )
        .unwrap();

        assert_eq!(config.fallback, FallbackPolicy::ConfirmedMissOnly);
        let endpoint = config.processing_endpoint();
        assert_eq!(endpoint.base_url(), "http://processing.internal:8080/api/v1");
        assert_eq!(
            endpoint.default_headers().get("X-Client").map(String::as_str),
            Some("relay")
        );
        assert_eq!(
            endpoint.default_headers().get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_endpoints_keep_credential_policies() {
        let config = RelayConfig::default();
        assert_eq!(config.session_endpoint().credentials(), CredentialPolicy::Include);
        assert_eq!(config.processing_endpoint().credentials(), CredentialPolicy::Omit);
    }

    #[test]
    fn test_toml_roundtrip_of_custom_config() {
        let mut config = RelayConfig::default();
        config.fallback = FallbackPolicy::ConfirmedMissOnly;
        config.session = EndpointConfig::with_base_url("http://auth.test/api");

        let rendered = config.to_toml().unwrap();
        assert_eq!(RelayConfig::parse_toml(&rendered).unwrap(), config);
    }

    // === Override Tests ===

    #[test]
    fn test_overrides_replace_addresses_and_policy() {
        let mut config = RelayConfig::default();
        config
            .apply_overrides(|var| match var {
                ENV_SESSION_URL => Some("http://auth.test/api".to_string()),
                ENV_PROCESSING_URL => Some("http://compute.test/api/v1".to_string()),
                ENV_FALLBACK => Some("confirmed-miss-only".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.session_endpoint().base_url(), "http://auth.test/api");
        assert_eq!(config.processing_endpoint().base_url(), "http://compute.test/api/v1");
        assert_eq!(config.fallback, FallbackPolicy::ConfirmedMissOnly);
    }

    #[test]
    fn test_invalid_policy_override() {
        let mut config = RelayConfig::default();
        let err = config
            .apply_overrides(|var| (var == ENV_FALLBACK).then(|| "never".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    // === Validation Tests ===

    #[test]
    fn test_relative_base_url_is_invalid() {
        let mut config = RelayConfig::default();
        config.session.base_url = Some("/api".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = RelayConfig::default();
        config.processing.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
