//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use relay_sdk::{RelayClient, RelayConfig};

use crate::output::Output;

/// Config file names, searched in order in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["relay.toml", ".relay.toml", "relay.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Effective configuration, environment overrides applied.
    pub config: RelayConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file or by discovery.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(PathBuf::from(path)),
            None => find_config(&cwd),
        };

        let mut config = match &config_path {
            Some(path) => RelayConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => RelayConfig::default(),
        };
        config
            .apply_env()
            .context("Failed to apply environment overrides")?;

        if let Some(path) = &config_path {
            output.debug(&format!("Using config {}", path.display()));
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Build a client from the effective configuration.
    pub fn client(&self) -> Result<RelayClient> {
        RelayClient::from_config(&self.config).context("Failed to create relay client")
    }
}

/// Find the nearest config file from `start` upward.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}
