//! Command-line walkthrough of the protocols.io read API.
//!
//! Loads a token, then prints the caller's profile, the protocols matching a
//! search key, and the steps and materials of one protocol.

mod config;

use anyhow::{Context, Result};
use protocols_core::ProtocolsClient;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env()?;
    info!("Using {}", config.base_url);
    let client = ProtocolsClient::with_base_url(config.token.as_str(), &config.base_url);

    let profile = client.get_profile().context("fetching profile")?;
    print_json(&profile)?;

    let protocols = client
        .list_protocols(config.filter, &config.key)
        .with_context(|| format!("listing {} protocols for `{}`", config.filter, config.key))?;
    info!("Found {} protocols", protocols.len());
    print_json(&Value::Array(protocols))?;

    let steps = client.get_protocol_steps(config.protocol_id)?;
    print_json(&steps)?;

    let materials = client.get_protocol_materials(config.protocol_id)?;
    print_json(&materials)?;

    Ok(())
}
