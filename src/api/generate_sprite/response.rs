// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sprite generation response types

use serde::{Deserialize, Serialize};

use crate::diffusion::Delivery;

/// Success body: `{ "imageUrl": .., "watermarked"?: .. }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSpriteResponse {
    /// Remote asset URL or inline `data:` URL
    pub image_url: String,
    /// Present for free-tier deliveries only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermarked: Option<bool>,
}

impl From<Delivery> for GenerateSpriteResponse {
    fn from(delivery: Delivery) -> Self {
        Self {
            image_url: delivery.image_url,
            watermarked: delivery.watermarked,
        }
    }
}
