//! Relay CLI - Command line client for the cache-then-compute backends.
//!
//! Commands:
//! - `relay process` - Resolve a key from cache, processing it on a miss
//! - `relay cached` - Look up a cached entry only
//! - `relay submit` - Submit input for processing only
//! - `relay token` - Fetch the session anti-forgery token
//! - `relay health` - Probe the processing service
//! - `relay config` - Manage configuration

mod commands;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CachedArgs, ConfigArgs, ProcessArgs, SubmitArgs};

/// Relay CLI - Resolve keys against the cache and processing backends
#[derive(Parser)]
#[command(name = "relay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "RELAY_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a key: cached result, or process it on a miss
    Process(ProcessArgs),

    /// Look up a cached entry without falling back
    Cached(CachedArgs),

    /// Submit input for processing
    Submit(SubmitArgs),

    /// Fetch the session anti-forgery token
    Token,

    /// Check the processing service health
    Health,

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json);

    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Process(args) => commands::process::run(args, &ctx).await,
        Commands::Cached(args) => commands::backend::cached(args, &ctx).await,
        Commands::Submit(args) => commands::backend::submit(args, &ctx).await,
        Commands::Token => commands::backend::token(&ctx).await,
        Commands::Health => commands::backend::health(&ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
