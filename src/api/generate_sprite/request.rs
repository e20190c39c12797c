// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sprite generation request types

use serde::{Deserialize, Serialize};

use crate::diffusion::{GenerationRequest, Tier};

/// Request for sprite generation via POST /api/generate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpriteRequest {
    /// Text prompt describing the sprite
    pub prompt: String,

    /// Art style label or preset id (defaults to pixel art)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    /// Premium flag set by the billing collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
}

impl GenerateSpriteRequest {
    pub fn tier(&self) -> Tier {
        Tier::from_premium_flag(self.is_premium.unwrap_or(false))
    }

    pub fn to_generation_request(&self) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt.clone(),
            style: self.style.clone(),
            tier: self.tier(),
        }
    }
}
