// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tiered delivery of a completed generation
//!
//! Premium callers get the upstream asset URL untouched. Free callers get the
//! asset downloaded, watermarked and inlined as a `data:` URL.
//!
//! If the download or the watermark fails, the free caller still receives the
//! original upstream URL with `watermarked: false`. A free-tier user can
//! therefore get an unwatermarked asset on this path; availability is
//! preferred over tier enforcement and changing it needs product sign-off.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::watermark::{BrandWatermark, WatermarkError, Watermarker};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Caller entitlement level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl Tier {
    pub fn from_premium_flag(is_premium: bool) -> Self {
        if is_premium {
            Tier::Premium
        } else {
            Tier::Free
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, Tier::Premium)
    }
}

/// Failure fetching the raw asset for watermarking
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Failed to fetch generated image: {0}")]
    Transport(String),

    #[error("Failed to fetch generated image: HTTP {0}")]
    Status(u16),
}

/// What the caller receives on success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// Remote URL or inline `data:` URL
    pub image_url: String,
    /// Absent for premium; `false` marks the free-tier fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermarked: Option<bool>,
}

impl Delivery {
    pub fn is_inline(&self) -> bool {
        self.image_url.starts_with("data:")
    }
}

/// Download seam for the free-tier path
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Unauthenticated HTTP download of upstream assets
pub struct HttpAssetFetcher {
    client: Client,
}

impl HttpAssetFetcher {
    pub fn new() -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| DownloadError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        debug!("Downloading generated asset GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DownloadError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Error)]
enum FallbackReason {
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error(transparent)]
    Watermark(#[from] WatermarkError),
    #[error("watermark task aborted: {0}")]
    Aborted(String),
}

/// Branches delivery on tier with a non-failing free-tier path
pub struct DeliveryRouter {
    fetcher: Arc<dyn AssetFetcher>,
    watermarker: Arc<dyn Watermarker>,
}

impl DeliveryRouter {
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self::with_watermarker(fetcher, Arc::new(BrandWatermark))
    }

    pub fn with_watermarker(
        fetcher: Arc<dyn AssetFetcher>,
        watermarker: Arc<dyn Watermarker>,
    ) -> Self {
        Self {
            fetcher,
            watermarker,
        }
    }

    /// Resolve the caller-facing delivery for a completed asset URL
    pub async fn deliver(&self, image_url: &str, tier: Tier) -> Delivery {
        if tier.is_premium() {
            info!("Premium user - returning original image");
            return Delivery {
                image_url: image_url.to_string(),
                watermarked: None,
            };
        }

        info!("Free user - adding watermark");
        match self.watermarked_data_url(image_url).await {
            Ok(data_url) => {
                info!("Watermark added successfully");
                Delivery {
                    image_url: data_url,
                    watermarked: Some(true),
                }
            }
            Err(e) => {
                warn!(
                    "Watermarking failed, falling back to original image: {}",
                    e
                );
                Delivery {
                    image_url: image_url.to_string(),
                    watermarked: Some(false),
                }
            }
        }
    }

    async fn watermarked_data_url(&self, image_url: &str) -> Result<String, FallbackReason> {
        let bytes = self.fetcher.fetch(image_url).await?;
        let watermarker = Arc::clone(&self.watermarker);
        let watermarked = tokio::task::spawn_blocking(move || watermarker.apply(&bytes))
            .await
            .map_err(|e| FallbackReason::Aborted(e.to_string()))??;
        Ok(watermarked.to_data_url())
    }
}
