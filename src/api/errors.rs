// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diffusion::GenerationError;

/// Failure body: `{ "error": .., "code": .. }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    Configuration(String),
    SubmissionFailed(String),
    GenerationFailed(String),
    UpstreamUnavailable(String),
    Timeout,
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Configuration(_) => "configuration_error",
            ApiError::SubmissionFailed(_) => "submission_failed",
            ApiError::GenerationFailed(_) => "generation_failed",
            ApiError::UpstreamUnavailable(_) => "upstream_unavailable",
            ApiError::Timeout => "timeout",
        }
    }

    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let message = match self {
            ApiError::InvalidRequest(msg)
            | ApiError::Configuration(msg)
            | ApiError::SubmissionFailed(msg)
            | ApiError::GenerationFailed(msg)
            | ApiError::UpstreamUnavailable(msg) => msg.clone(),
            ApiError::Timeout => "Generation timed out. Please try again.".to_string(),
        };

        ErrorResponse {
            error: message,
            code: self.error_code().to_string(),
            request_id,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::Configuration(_) => 500,
            ApiError::SubmissionFailed(_) => 502,
            ApiError::GenerationFailed(_) => 500,
            ApiError::UpstreamUnavailable(_) => 502,
            ApiError::Timeout => 504,
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        let message = err.user_message();
        match err {
            GenerationError::Configuration(_) => ApiError::Configuration(message),
            GenerationError::InvalidRequest(_) => ApiError::InvalidRequest(message),
            GenerationError::UpstreamProtocol(_) => ApiError::SubmissionFailed(message),
            GenerationError::UpstreamTransport(_) => ApiError::UpstreamUnavailable(message),
            GenerationError::UpstreamJobFailure { .. } => ApiError::GenerationFailed(message),
            GenerationError::Timeout { .. } => ApiError::Timeout,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ApiError::SubmissionFailed(msg) => write!(f, "Submission failed: {}", msg),
            ApiError::GenerationFailed(msg) => write!(f, "Generation failed: {}", msg),
            ApiError::UpstreamUnavailable(msg) => write!(f, "Upstream unavailable: {}", msg),
            ApiError::Timeout => write!(f, "Generation timed out"),
        }
    }
}

impl std::error::Error for ApiError {}

/// `ApiError` tagged with the request id it belongs to
pub struct ApiErrorResponse {
    pub error: ApiError,
    pub request_id: Option<String>,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.error.to_response(self.request_id))).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiErrorResponse {
            error: self,
            request_id: None,
        }
        .into_response()
    }
}
