// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use sprite_generator::{
    api::start_server,
    config::{GeneratorConfig, ServerConfig},
    diffusion::SpriteGenerator,
    version,
};
use std::env;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!(
        "Starting Sprite Generator node {} (built {})",
        version::VERSION,
        version::BUILD_DATE
    );

    let generator_config = GeneratorConfig::from_env();
    generator_config
        .validate()
        .map_err(|e| anyhow!("invalid configuration: {}", e))?;

    if !generator_config.has_api_key() {
        warn!("EVOLINK_API_KEY not configured; generate requests will return a configuration error");
    }

    let server_config = ServerConfig::from_env();
    let generator = SpriteGenerator::from_config(&generator_config)?;

    tokio::select! {
        result = start_server(&server_config, generator) => result?,
        _ = signal::ctrl_c() => info!("Shutdown signal received"),
    }

    Ok(())
}
