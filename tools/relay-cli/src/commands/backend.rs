//! Single backend operation commands.

use anyhow::{bail, Result};
use relay_sdk::relay_api::DataBackend;

use super::{fail, CachedArgs, SubmitArgs};
use crate::context::Context;
use crate::output::status_badge;

/// Look up a cached entry without fallback.
pub async fn cached(args: CachedArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let spinner = ctx.output.spinner(&format!("Checking cache for {}", args.key));
    let result = client.processing().fetch_cached_data(args.key.trim()).await;
    spinner.finish_and_clear();

    match result {
        Ok(envelope) => {
            ctx.output.header("Cached Result:");
            ctx.output.json(&envelope);
            Ok(())
        }
        Err(err) => fail(ctx, err),
    }
}

/// Submit input for processing without a cache lookup.
pub async fn submit(args: SubmitArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let spinner = ctx.output.spinner(&format!("Processing {}", args.input));
    let result = client.processing().submit_for_processing(&args.input).await;
    spinner.finish_and_clear();

    match result {
        Ok(envelope) => {
            ctx.output.header("Processed Result:");
            ctx.output.json(&envelope);
            Ok(())
        }
        Err(err) => fail(ctx, err),
    }
}

/// Print the session token.
pub async fn token(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    match client.session_token().await {
        Ok(token) => {
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({ "token": token }));
            } else {
                println!("{}", token);
            }
            Ok(())
        }
        Err(err) => fail(ctx, err),
    }
}

/// Probe the processing service.
pub async fn health(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    match client.health().await {
        Ok(status) => {
            if ctx.output.is_json() {
                ctx.output.json(&status);
            } else {
                ctx.output.kv("processing", &status_badge(&status.status));
            }
            if status.is_healthy() {
                Ok(())
            } else {
                bail!("Processing service reports '{}'", status.status)
            }
        }
        Err(err) => fail(ctx, err),
    }
}
