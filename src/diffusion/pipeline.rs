// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end sprite generation: configuration check → prompt → poll → deliver

use std::sync::Arc;
use tracing::{error, info};

use super::client::{EvolinkClient, GenerationService, DEFAULT_SIZE};
use super::delivery::{AssetFetcher, Delivery, DeliveryRouter, HttpAssetFetcher, Tier};
use super::errors::GenerationError;
use super::orchestrator::{PollingOrchestrator, Sleeper, TokioSleeper};
use super::prompt::{enhance_prompt, validate_prompt};
use super::watermark::{BrandWatermark, Watermarker};
use crate::config::GeneratorConfig;

/// One caller request; immutable once submitted
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: Option<String>,
    pub tier: Tier,
}

/// Pipeline facade used by the HTTP layer
pub struct SpriteGenerator {
    /// `None` when no upstream credential is configured
    service: Option<Arc<dyn GenerationService>>,
    fetcher: Arc<dyn AssetFetcher>,
    sleeper: Arc<dyn Sleeper>,
    watermarker: Arc<dyn Watermarker>,
    image_size: String,
}

impl SpriteGenerator {
    pub fn new(service: Option<Arc<dyn GenerationService>>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            service,
            fetcher,
            sleeper: Arc::new(TokioSleeper),
            watermarker: Arc::new(BrandWatermark),
            image_size: DEFAULT_SIZE.to_string(),
        }
    }

    /// Build the production pipeline from configuration.
    ///
    /// A missing credential is not an error here; it is reported per request.
    pub fn from_config(config: &GeneratorConfig) -> anyhow::Result<Self> {
        let service: Option<Arc<dyn GenerationService>> = match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(Arc::new(EvolinkClient::new(
                &config.api_base,
                key,
                &config.model,
            )?)),
            _ => None,
        };
        let fetcher = Arc::new(HttpAssetFetcher::new()?);
        Ok(Self::new(service, fetcher).with_image_size(&config.image_size))
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_watermarker(mut self, watermarker: Arc<dyn Watermarker>) -> Self {
        self.watermarker = watermarker;
        self
    }

    pub fn with_image_size(mut self, size: &str) -> Self {
        self.image_size = size.to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    /// Run one generation request to a caller-facing delivery
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Delivery, GenerationError> {
        let service = self.service.as_ref().ok_or_else(|| {
            error!("EVOLINK_API_KEY not configured");
            GenerationError::Configuration("API Key missing".to_string())
        })?;

        validate_prompt(&request.prompt).map_err(GenerationError::InvalidRequest)?;

        let enhanced = enhance_prompt(&request.prompt, request.style.as_deref());
        info!("Enhanced prompt: \"{}\"", enhanced);

        let orchestrator =
            PollingOrchestrator::with_sleeper(Arc::clone(service), Arc::clone(&self.sleeper));
        let completed = orchestrator.run(&enhanced, &self.image_size).await?;

        let router =
            DeliveryRouter::with_watermarker(Arc::clone(&self.fetcher), Arc::clone(&self.watermarker));
        Ok(router.deliver(&completed.image_url, request.tier).await)
    }
}
