//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use relay_sdk::{generate_default_config, EndpointConfig, RelayConfig};

use super::{ConfigArgs, ConfigCommand};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("fallback", ctx.config.fallback.name());

    let endpoints = [
        ("session", &ctx.config.session, ctx.config.session_endpoint()),
        ("processing", &ctx.config.processing, ctx.config.processing_endpoint()),
    ];
    for (section, settings, endpoint) in endpoints {
        ctx.output.info("");
        ctx.output.info(&format!("[{}]", section));
        ctx.output.kv("base_url", endpoint.base_url());
        ctx.output.kv("timeout_ms", &settings.timeout_ms.to_string());
        ctx.output.kv("credentials", credentials_label(&endpoint));
        for (key, value) in &settings.headers {
            ctx.output.kv(&format!("headers.{}", key), value);
        }
    }

    Ok(())
}

fn credentials_label(endpoint: &relay_sdk::relay_transport::BackendEndpoint) -> &'static str {
    if endpoint.credentials().includes_credentials() {
        "include"
    } else {
        "omit"
    }
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = get_config_value(&ctx.config, key)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    ctx.config.validate()?;

    for (section, settings) in [
        ("session", &ctx.config.session),
        ("processing", &ctx.config.processing),
    ] {
        if settings.base_url.is_none() {
            ctx.output.warn(&format!(
                "Warning: {}.base_url not set, using the default",
                section
            ));
        }
    }

    ctx.output.success("Configuration is valid");

    Ok(())
}

fn get_config_value(config: &RelayConfig, key: &str) -> Result<String> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["fallback"] => Ok(config.fallback.name().to_string()),
        ["session", field] => endpoint_value(
            &config.session,
            config.session_endpoint().base_url(),
            field,
            key,
        ),
        ["processing", field] => endpoint_value(
            &config.processing,
            config.processing_endpoint().base_url(),
            field,
            key,
        ),
        ["session", "headers", name] => header_value(&config.session, name, key),
        ["processing", "headers", name] => header_value(&config.processing, name, key),
        _ => bail!("Unknown config key: {}", key),
    }
}

fn endpoint_value(
    settings: &EndpointConfig,
    base_url: &str,
    field: &str,
    key: &str,
) -> Result<String> {
    match field {
        "base_url" => Ok(base_url.to_string()),
        "timeout_ms" => Ok(settings.timeout_ms.to_string()),
        _ => bail!("Unknown config key: {}", key),
    }
}

fn header_value(settings: &EndpointConfig, name: &str, key: &str) -> Result<String> {
    match settings.headers.get(name) {
        Some(value) => Ok(value.clone()),
        None => bail!("Unknown config key: {}", key),
    }
}
