// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod generate;
pub mod usage;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Default location of the client-local usage record
pub const DEFAULT_USAGE_FILE: &str = "sprite_generator_usage.json";

/// Sprite Generator client CLI
#[derive(Parser, Debug)]
#[command(name = "sprite-cli")]
#[command(version = "0.1.0")]
#[command(about = "Generate sprite sheets and manage the local daily quota", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a sprite sheet through a running server
    Generate(generate::GenerateArgs),

    /// Inspect or change the local usage record
    #[command(subcommand)]
    Usage(usage::UsageCommand),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate(args) => generate::run(args).await,
        Commands::Usage(command) => usage::run(command).await,
    }
}
