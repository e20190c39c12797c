// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment-driven configuration for the generation server

use std::env;
use url::Url;

use crate::diffusion::client::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_SIZE};

/// Upstream generation service settings
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Bearer credential; `None` leaves the server up but unable to generate
    pub api_key: Option<String>,
    /// Base URL of the upstream task API
    pub api_base: String,
    /// Upstream model name
    pub model: String,
    /// Requested output size / aspect ratio
    pub image_size: String,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl GeneratorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("EVOLINK_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            api_base: env::var("EVOLINK_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            model: env::var("EVOLINK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            image_size: env::var("SPRITE_IMAGE_SIZE").unwrap_or_else(|_| DEFAULT_SIZE.to_string()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        Url::parse(&self.api_base)
            .map_err(|e| format!("EVOLINK_API_BASE '{}' is not a valid URL: {}", self.api_base, e))?;
        if self.model.trim().is_empty() {
            return Err("EVOLINK_MODEL must not be empty".to_string());
        }
        if self.image_size.trim().is_empty() {
            return Err("SPRITE_IMAGE_SIZE must not be empty".to_string());
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            image_size: DEFAULT_SIZE.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}
