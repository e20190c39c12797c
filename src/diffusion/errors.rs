// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the sprite generation pipeline
//!
//! Only the states that leave the caller without any image are surfaced:
//! - Configuration errors (missing upstream credential)
//! - Upstream protocol errors (submit returned no usable task id)
//! - Upstream transport errors (network failure, non-2xx)
//! - Upstream job failures (task reported `failed`)
//! - Timeouts (polling ceiling reached)
//!
//! Failures after a successful generation (download, watermark) are
//! recovered in the delivery router and never become a `GenerationError`.

use thiserror::Error;

/// Errors that can terminate a generation request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Upstream API credential is not configured
    #[error("Server configuration error: {0}")]
    Configuration(String),

    /// Request rejected before any upstream work
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream answered with a body we cannot use (e.g. no task id)
    #[error("Upstream protocol error: {0}")]
    UpstreamProtocol(String),

    /// Network failure or non-2xx response from upstream
    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    /// Upstream reported the task as failed
    #[error("Generation failed: {message}")]
    UpstreamJobFailure { task_id: String, message: String },

    /// Task never reached a terminal status within the polling budget
    #[error("Task {task_id} timed out after {attempts} polling attempts")]
    Timeout { task_id: String, attempts: u32 },
}

impl GenerationError {
    /// Stable error code for API responses and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            GenerationError::Configuration(_) => "configuration_error",
            GenerationError::InvalidRequest(_) => "invalid_request",
            GenerationError::UpstreamProtocol(_) => "submission_failed",
            GenerationError::UpstreamTransport(_) => "upstream_unavailable",
            GenerationError::UpstreamJobFailure { .. } => "generation_failed",
            GenerationError::Timeout { .. } => "timeout",
        }
    }

    /// HTTP status the API layer maps this error to
    pub fn status_code(&self) -> u16 {
        match self {
            GenerationError::Configuration(_) => 500,
            GenerationError::InvalidRequest(_) => 400,
            GenerationError::UpstreamProtocol(_) => 502,
            GenerationError::UpstreamTransport(_) => 502,
            GenerationError::UpstreamJobFailure { .. } => 500,
            GenerationError::Timeout { .. } => 504,
        }
    }

    /// Message shown to the end user
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Configuration(_) => {
                "Server configuration error: API Key missing".to_string()
            }
            GenerationError::InvalidRequest(msg) => msg.clone(),
            GenerationError::UpstreamProtocol(_) => "Failed to start generation task".to_string(),
            GenerationError::UpstreamTransport(msg) => {
                format!("Image generation service unavailable: {}", msg)
            }
            GenerationError::UpstreamJobFailure { message, .. } => message.clone(),
            GenerationError::Timeout { .. } => {
                "Generation timed out. Please try again.".to_string()
            }
        }
    }

    /// Whether the caller may reasonably try the same request again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::UpstreamTransport(_) | GenerationError::Timeout { .. }
        )
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerationError::UpstreamProtocol(err.to_string())
        } else {
            GenerationError::UpstreamTransport(err.to_string())
        }
    }
}
