//! CLI command implementations.

pub mod backend;
pub mod config;
pub mod process;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use relay_sdk::relay_transport::NormalizedError;

use crate::context::Context;
use crate::output::user_message;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Key to resolve; prompted for when omitted.
    pub key: Option<String>,

    /// Only fall back to processing on a confirmed cache miss.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the cached command.
#[derive(Args)]
pub struct CachedArgs {
    /// Cache key.
    pub key: String,
}

/// Arguments for the submit command.
#[derive(Args)]
pub struct SubmitArgs {
    /// Input to process.
    pub input: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated).
        key: String,
    },
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the effective configuration.
    Validate,
}

/// Report a failed backend call and turn it into a command error.
pub(crate) fn fail(ctx: &Context, err: NormalizedError) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&err);
    } else {
        ctx.output.header("Error");
    }
    bail!("{}", user_message(&err))
}
