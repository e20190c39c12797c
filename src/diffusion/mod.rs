// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sprite generation via an upstream task API with tiered, watermarked delivery

pub mod client;
pub mod delivery;
pub mod errors;
pub mod orchestrator;
pub mod pipeline;
pub mod prompt;
pub mod watermark;

pub use client::{EvolinkClient, GenerationJob, GenerationService, TaskStatus};
pub use delivery::{AssetFetcher, Delivery, DeliveryRouter, DownloadError, HttpAssetFetcher, Tier};
pub use errors::GenerationError;
pub use orchestrator::{CompletedTask, PollState, PollingOrchestrator, Sleeper, TokioSleeper};
pub use pipeline::{GenerationRequest, SpriteGenerator};
pub use watermark::{apply_watermark, BrandWatermark, WatermarkError, WatermarkSpec, Watermarker};
