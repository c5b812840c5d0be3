//! Key resolution command.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use dialoguer::Input;
use indicatif::ProgressBar;
use relay_sdk::relay_executor::{
    FallbackPolicy, OrchestratorState, Resolved, Source, StateObserver,
};

use super::{fail, ProcessArgs};
use crate::context::Context;

/// Run the process command.
pub async fn run(args: ProcessArgs, ctx: &Context) -> Result<()> {
    let raw = match args.key {
        Some(key) => key,
        None if ctx.output.is_json() => String::new(),
        None => Input::<String>::new()
            .with_prompt("Key")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read key")?,
    };

    let key = raw.trim();
    if key.is_empty() {
        ctx.output.warn("Please enter a key");
        return Ok(());
    }

    let spinner = ctx.output.spinner(&format!("Resolving {}", key));
    let mut client = ctx.client()?.with_observer(Arc::new(SpinnerObserver {
        bar: spinner.clone(),
    }));
    if args.strict {
        client = client.with_policy(FallbackPolicy::ConfirmedMissOnly);
    }

    let result = client.process_key(key).await;
    spinner.finish_and_clear();

    match result {
        Ok(resolved) => {
            if ctx.output.is_json() {
                ctx.output.json(&resolved);
                return Ok(());
            }
            ctx.output.header(result_title(resolved.source()));
            match &resolved {
                Resolved::Cache(envelope) => ctx.output.json(envelope),
                Resolved::Processed(envelope) => ctx.output.json(envelope),
            }
            if let Some(msg) = resolved.soft_error() {
                ctx.output.warn(msg);
            }
            Ok(())
        }
        Err(err) => fail(ctx, err),
    }
}

/// Heading for a successful result.
pub fn result_title(source: Source) -> &'static str {
    match source {
        Source::Cache => "Cached Result:",
        Source::Processed => "Processed Result:",
    }
}

/// Mirrors orchestrator progress on the spinner.
struct SpinnerObserver {
    bar: ProgressBar,
}

impl StateObserver for SpinnerObserver {
    fn on_transition(&self, key: &str, state: &OrchestratorState) {
        let msg = match state {
            OrchestratorState::AwaitingCache => format!("Checking cache for {}", key),
            OrchestratorState::AwaitingProcess => format!("Processing {}", key),
            _ => return,
        };
        self.bar.set_message(msg);
    }
}
