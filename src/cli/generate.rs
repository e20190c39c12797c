// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Args;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::DEFAULT_USAGE_FILE;
use crate::api::{ErrorResponse, GenerateSpriteRequest, GenerateSpriteResponse};
use crate::diffusion::prompt::{random_example, validate_prompt};
use crate::usage::{FileUsageStore, UsageTracker};

/// Longer than the server's 60s polling ceiling
const CLIENT_TIMEOUT: Duration = Duration::from_secs(90);

/// Arguments for the generate command
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Sprite description
    #[arg(long, required_unless_present = "random")]
    pub prompt: Option<String>,

    /// Art style (e.g. "Pixel Art", "16-bit", "anime")
    #[arg(long)]
    pub style: Option<String>,

    /// Use one of the built-in example prompts
    #[arg(long, conflicts_with = "prompt")]
    pub random: bool,

    /// Base URL of the generation server
    #[arg(long, env = "SPRITE_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    pub server: String,

    /// Where to save an inline (watermarked) image
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Local usage record file
    #[arg(long, env = "SPRITE_USAGE_FILE", default_value = DEFAULT_USAGE_FILE)]
    pub usage_file: PathBuf,
}

/// Result of a successful generate command
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOutcome {
    pub response: GenerateSpriteResponse,
    /// File written for inline images
    pub saved_to: Option<PathBuf>,
}

pub async fn run(args: GenerateArgs) -> Result<()> {
    let tracker = UsageTracker::new(Arc::new(FileUsageStore::new(&args.usage_file)));
    let outcome = generate_with_tracker(&args, &tracker).await?;

    match &outcome.saved_to {
        Some(path) => println!("Saved sprite sheet to {}", path.display()),
        None => println!("{}", outcome.response.image_url),
    }
    if outcome.response.watermarked == Some(false) {
        println!("Note: watermarking was unavailable; the image was delivered without it");
    }
    println!("Remaining generations today: {}", tracker.remaining().await);
    Ok(())
}

/// Gate on the quota, call the server, and count the generation only on success
pub async fn generate_with_tracker(
    args: &GenerateArgs,
    tracker: &UsageTracker,
) -> Result<GenerateOutcome> {
    let prompt = match (&args.prompt, args.random) {
        (_, true) => random_example().to_string(),
        (Some(prompt), false) => prompt.clone(),
        (None, false) => bail!("--prompt is required unless --random is set"),
    };
    validate_prompt(&prompt).map_err(|e| anyhow!(e))?;

    let record = tracker.read().await;
    if !record.can_generate(tracker.daily_limit()) {
        bail!(
            "Daily limit reached ({} generations). Upgrade to premium for unlimited generations.",
            tracker.daily_limit()
        );
    }

    let request = GenerateSpriteRequest {
        prompt,
        style: args.style.clone(),
        is_premium: Some(record.is_premium),
    };
    let response = request_generation(&args.server, &request).await?;

    tracker
        .increment()
        .await
        .context("generation succeeded but usage could not be recorded")?;

    let saved_to = match (&args.output, decode_data_url(&response.image_url)) {
        (Some(path), Some((_, bytes))) => {
            tokio::fs::write(path, bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            Some(path.clone())
        }
        (Some(_), None) => {
            warn!("Server returned a remote URL; nothing written to --output");
            None
        }
        _ => None,
    };

    Ok(GenerateOutcome { response, saved_to })
}

/// POST the request to `{server}/api/generate`
pub async fn request_generation(
    server: &str,
    request: &GenerateSpriteRequest,
) -> Result<GenerateSpriteResponse> {
    let client = Client::builder().timeout(CLIENT_TIMEOUT).build()?;
    let url = format!("{}/api/generate", server.trim_end_matches('/'));
    info!("Requesting generation from {}", url);

    let response = client.post(&url).json(request).send().await?;
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        bail!("Generation failed ({}): {}", status, message);
    }

    let body: GenerateSpriteResponse = response.json().await?;
    if body.image_url.is_empty() {
        bail!("No image URL returned from server");
    }
    Ok(body)
}

/// Split a base64 `data:` URL into its MIME type and bytes
pub fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}
