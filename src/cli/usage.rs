// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use super::DEFAULT_USAGE_FILE;
use crate::usage::{FileUsageStore, UsageTracker};

#[derive(Subcommand, Debug)]
pub enum UsageCommand {
    /// Show today's usage and remaining generations
    Show(UsageArgs),

    /// Mark this client as premium (unlimited)
    Upgrade(UsageArgs),

    /// Return this client to the free tier
    Downgrade(UsageArgs),
}

#[derive(Args, Debug)]
pub struct UsageArgs {
    /// Local usage record file
    #[arg(long, env = "SPRITE_USAGE_FILE", default_value = DEFAULT_USAGE_FILE)]
    pub usage_file: PathBuf,
}

pub async fn run(command: UsageCommand) -> Result<()> {
    match command {
        UsageCommand::Show(args) => {
            let tracker = tracker_for(&args);
            let record = tracker.read().await;
            println!("Date:      {}", record.date);
            println!("Tier:      {}", if record.is_premium { "premium" } else { "free" });
            println!("Used:      {}/{}", record.count, tracker.daily_limit());
            println!("Remaining: {}", record.remaining(tracker.daily_limit()));
        }
        UsageCommand::Upgrade(args) => {
            tracker_for(&args).set_premium(true).await?;
            println!("Premium enabled: unlimited generations without watermark");
        }
        UsageCommand::Downgrade(args) => {
            let record = tracker_for(&args).set_premium(false).await?;
            println!(
                "Free tier: {} generations left today",
                record.remaining(crate::usage::DAILY_LIMIT)
            );
        }
    }
    Ok(())
}

fn tracker_for(args: &UsageArgs) -> UsageTracker {
    UsageTracker::new(Arc::new(FileUsageStore::new(&args.usage_file)))
}
