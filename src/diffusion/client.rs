// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upstream image generation service client (Evolink-compatible task API)
//!
//! The client only submits tasks and reads their status. It never retries and
//! never polls; that policy lives in the orchestrator.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::errors::GenerationError;

pub const DEFAULT_API_BASE: &str = "https://api.evolink.ai/v1";
pub const DEFAULT_MODEL: &str = "z-image-turbo";
/// Aspect ratio requested for sprite sheets
pub const DEFAULT_SIZE: &str = "1:1";

/// Per-call timeout on the underlying HTTP client
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Lifecycle status of an upstream task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Local read-through mirror of an upstream task
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationJob {
    pub id: String,
    pub status: TaskStatus,
    /// Asset URLs, in upstream order; empty until completion
    pub results: Vec<String>,
    pub error: Option<String>,
}

impl GenerationJob {
    /// First listed result, the canonical asset for a sprite sheet
    pub fn first_result(&self) -> Option<&str> {
        self.results.first().map(String::as_str)
    }
}

/// Body of `POST /images/generations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTaskRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
}

// --- Upstream wire types ---

#[derive(Debug, Deserialize)]
pub struct TaskResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub results: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<UpstreamErrorBody>,
}

/// Upstream sends either `{"message": ".."}` or a bare string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UpstreamErrorBody {
    Detailed { message: String },
    Text(String),
}

impl UpstreamErrorBody {
    pub fn into_message(self) -> String {
        match self {
            UpstreamErrorBody::Detailed { message } => message,
            UpstreamErrorBody::Text(text) => text,
        }
    }
}

/// Transport seam between the orchestrator and the upstream service
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Create a task; the returned job always carries a non-empty id
    async fn submit(&self, prompt: &str, size: &str) -> Result<GenerationJob, GenerationError>;

    /// Read the current state of a task
    async fn fetch_status(&self, task_id: &str) -> Result<GenerationJob, GenerationError>;
}

/// reqwest-backed client for the upstream task API
pub struct EvolinkClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl EvolinkClient {
    /// Create a new client; an empty credential is a configuration error
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::Configuration(
                "EVOLINK_API_KEY not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Configuration(format!("HTTP client: {}", e)))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!(
            "Generation client configured: base_url={}, model={}",
            base_url, model
        );

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check_status(response: Response) -> Result<Response, GenerationError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(GenerationError::UpstreamTransport(format!(
            "upstream returned {}: {}",
            status, text
        )))
    }
}

#[async_trait]
impl GenerationService for EvolinkClient {
    async fn submit(&self, prompt: &str, size: &str) -> Result<GenerationJob, GenerationError> {
        let url = format!("{}/images/generations", self.base_url);
        debug!("Generation submit POST {}", url);

        let body = SubmitTaskRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            size: size.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let task: TaskResponse = response.json().await.map_err(|e| {
            GenerationError::UpstreamProtocol(format!("malformed submit response: {}", e))
        })?;

        let id = task
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| GenerationError::UpstreamProtocol("no task id".to_string()))?;

        Ok(GenerationJob {
            id,
            status: task.status,
            results: task.results.unwrap_or_default(),
            error: task.error.map(UpstreamErrorBody::into_message),
        })
    }

    async fn fetch_status(&self, task_id: &str) -> Result<GenerationJob, GenerationError> {
        let url = format!("{}/tasks/{}", self.base_url, task_id);
        debug!("Generation status GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let task: TaskResponse = response.json().await.map_err(|e| {
            GenerationError::UpstreamProtocol(format!("malformed status response: {}", e))
        })?;

        Ok(GenerationJob {
            id: task.id.unwrap_or_else(|| task_id.to_string()),
            status: task.status,
            results: task.results.unwrap_or_default(),
            error: task.error.map(UpstreamErrorBody::into_message),
        })
    }
}
