// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /api/generate and GET /health through the router

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sprite_generator::api::{create_app, AppState, ErrorResponse, GenerateSpriteResponse, HealthResponse};
use sprite_generator::diffusion::{
    AssetFetcher, DownloadError, GenerationError, GenerationJob, GenerationService, Sleeper,
    SpriteGenerator, TaskStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`

/// Upstream whose tasks end in a fixed status
struct FixedOutcome {
    status: TaskStatus,
    error: Option<String>,
}

#[async_trait]
impl GenerationService for FixedOutcome {
    async fn submit(&self, _prompt: &str, _size: &str) -> Result<GenerationJob, GenerationError> {
        Ok(GenerationJob {
            id: "task-7".to_string(),
            status: TaskStatus::Pending,
            results: Vec::new(),
            error: None,
        })
    }

    async fn fetch_status(&self, task_id: &str) -> Result<GenerationJob, GenerationError> {
        let results = match self.status {
            TaskStatus::Completed => vec!["https://cdn.example/sheet.png".to_string()],
            _ => Vec::new(),
        };
        Ok(GenerationJob {
            id: task_id.to_string(),
            status: self.status,
            results,
            error: self.error.clone(),
        })
    }
}

/// Upstream that accepts the request but never issues a task id
struct NoTaskId;

#[async_trait]
impl GenerationService for NoTaskId {
    async fn submit(&self, _prompt: &str, _size: &str) -> Result<GenerationJob, GenerationError> {
        Err(GenerationError::UpstreamProtocol("no task id".to_string()))
    }

    async fn fetch_status(&self, _task_id: &str) -> Result<GenerationJob, GenerationError> {
        panic!("status must not be fetched without a task id");
    }
}

struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

struct OfflineFetcher;

#[async_trait]
impl AssetFetcher for OfflineFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, DownloadError> {
        Err(DownloadError::Status(404))
    }
}

fn app_with(service: Option<FixedOutcome>) -> Router {
    app_with_service(service.map(|s| Arc::new(s) as Arc<dyn GenerationService>))
}

fn app_with_service(service: Option<Arc<dyn GenerationService>>) -> Router {
    let generator =
        SpriteGenerator::new(service, Arc::new(OfflineFetcher)).with_sleeper(Arc::new(NoSleep));
    create_app(AppState::new(generator))
}

fn generate_request(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_configuration() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app_with(None).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = read_json(response).await;
    assert_eq!(health.status, "ok");
    assert!(!health.configured);
}

#[tokio::test]
async fn test_missing_credential_returns_500() {
    let response = app_with(None)
        .oneshot(generate_request(json!({"prompt": "a knight"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.code, "configuration_error");
    assert_eq!(body.error, "Server configuration error: API Key missing");
    assert!(body.request_id.is_some());
}

#[tokio::test]
async fn test_premium_success_returns_remote_url() {
    let service = FixedOutcome {
        status: TaskStatus::Completed,
        error: None,
    };
    let response = app_with(Some(service))
        .oneshot(generate_request(
            json!({"prompt": "a knight", "style": "16-bit", "isPremium": true}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = read_json(response).await;
    assert_eq!(body["imageUrl"], "https://cdn.example/sheet.png");
    assert!(body.get("watermarked").is_none());
}

#[tokio::test]
async fn test_free_success_reports_watermark_fallback() {
    let service = FixedOutcome {
        status: TaskStatus::Completed,
        error: None,
    };
    let response = app_with(Some(service))
        .oneshot(generate_request(json!({"prompt": "a knight"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: GenerateSpriteResponse = read_json(response).await;
    assert_eq!(body.image_url, "https://cdn.example/sheet.png");
    assert_eq!(body.watermarked, Some(false));
}

#[tokio::test]
async fn test_failed_task_returns_500_with_upstream_message() {
    let service = FixedOutcome {
        status: TaskStatus::Failed,
        error: Some("content policy violation".to_string()),
    };
    let response = app_with(Some(service))
        .oneshot(generate_request(json!({"prompt": "a knight"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.code, "generation_failed");
    assert_eq!(body.error, "content policy violation");
}

#[tokio::test]
async fn test_stuck_task_returns_504() {
    let service = FixedOutcome {
        status: TaskStatus::Processing,
        error: None,
    };
    let response = app_with(Some(service))
        .oneshot(generate_request(json!({"prompt": "a knight"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.code, "timeout");
    assert_eq!(body.error, "Generation timed out. Please try again.");
}

#[tokio::test]
async fn test_blank_prompt_returns_400() {
    let service = FixedOutcome {
        status: TaskStatus::Completed,
        error: None,
    };
    let response = app_with(Some(service))
        .oneshot(generate_request(json!({"prompt": "  "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.code, "invalid_request");
}

#[tokio::test]
async fn test_submission_without_task_id_returns_502() {
    let response = app_with_service(Some(Arc::new(NoTaskId)))
        .oneshot(generate_request(json!({"prompt": "a knight"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.code, "submission_failed");
    assert_eq!(body.error, "Failed to start generation task");
}
