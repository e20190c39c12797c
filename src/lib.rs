// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod diffusion;
pub mod usage;
pub mod version;

// Re-export main types
pub use config::{GeneratorConfig, ServerConfig};
pub use diffusion::{
    Delivery, GenerationError, GenerationRequest, SpriteGenerator, Tier,
};
pub use usage::{UsageRecord, UsageTracker};
