// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end generator behaviour with fake upstream and instant polling

use async_trait::async_trait;
use sprite_generator::diffusion::{
    AssetFetcher, DownloadError, GenerationError, GenerationJob, GenerationRequest,
    GenerationService, Sleeper, SpriteGenerator, TaskStatus, Tier,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Completes on the first poll and records every prompt it was given
#[derive(Default)]
struct InstantService {
    prompts: Mutex<Vec<String>>,
    sizes: Mutex<Vec<String>>,
}

#[async_trait]
impl GenerationService for InstantService {
    async fn submit(&self, prompt: &str, size: &str) -> Result<GenerationJob, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.sizes.lock().unwrap().push(size.to_string());
        Ok(GenerationJob {
            id: "task-1".to_string(),
            status: TaskStatus::Pending,
            results: Vec::new(),
            error: None,
        })
    }

    async fn fetch_status(&self, task_id: &str) -> Result<GenerationJob, GenerationError> {
        Ok(GenerationJob {
            id: task_id.to_string(),
            status: TaskStatus::Completed,
            results: vec!["https://cdn.example/sheet.png".to_string()],
            error: None,
        })
    }
}

struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

struct UnreachableFetcher;

#[async_trait]
impl AssetFetcher for UnreachableFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, DownloadError> {
        Err(DownloadError::Transport("offline".to_string()))
    }
}

fn request(prompt: &str, style: Option<&str>, tier: Tier) -> GenerationRequest {
    GenerationRequest {
        prompt: prompt.to_string(),
        style: style.map(str::to_string),
        tier,
    }
}

fn generator(service: Arc<InstantService>) -> SpriteGenerator {
    SpriteGenerator::new(Some(service), Arc::new(UnreachableFetcher)).with_sleeper(Arc::new(NoSleep))
}

#[tokio::test]
async fn test_missing_credential_never_reaches_upstream() {
    let generator = SpriteGenerator::new(None, Arc::new(UnreachableFetcher));
    assert!(!generator.is_configured());

    let err = generator
        .generate(&request("a knight", None, Tier::Free))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Configuration(_)));
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.user_message(), "Server configuration error: API Key missing");
}

#[tokio::test]
async fn test_empty_prompt_is_rejected_before_submit() {
    let service = Arc::new(InstantService::default());
    let err = generator(service.clone())
        .generate(&request("   ", None, Tier::Free))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "invalid_request");
    assert!(service.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_premium_receives_upstream_url() {
    let service = Arc::new(InstantService::default());
    let delivery = generator(service.clone())
        .generate(&request("a knight", Some("Pixel Art"), Tier::Premium))
        .await
        .unwrap();

    assert_eq!(delivery.image_url, "https://cdn.example/sheet.png");
    assert_eq!(delivery.watermarked, None);

    let prompt = service.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("a knight"));
    assert!(prompt.contains("Pixel Art"));
}

#[tokio::test]
async fn test_free_tier_falls_back_when_asset_is_unreachable() {
    let service = Arc::new(InstantService::default());
    let delivery = generator(service)
        .generate(&request("a knight", None, Tier::Free))
        .await
        .unwrap();

    assert_eq!(delivery.image_url, "https://cdn.example/sheet.png");
    assert_eq!(delivery.watermarked, Some(false));
}

#[tokio::test]
async fn test_configured_image_size_is_forwarded() {
    let service = Arc::new(InstantService::default());
    generator(service.clone())
        .with_image_size("16:9")
        .generate(&request("a knight", None, Tier::Premium))
        .await
        .unwrap();
    assert_eq!(service.sizes.lock().unwrap()[0], "16:9");
}
