// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sprite generation endpoint handler

use axum::{extract::State, Json};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::request::GenerateSpriteRequest;
use super::response::GenerateSpriteResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;

/// POST /api/generate - Generate a sprite sheet from a text prompt
///
/// Holds the connection open for the whole submit/poll cycle (up to 60s).
/// Errors map to distinct statuses: configuration 500, submission 502,
/// job failure 500, timeout 504.
pub async fn generate_sprite_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateSpriteRequest>,
) -> Result<Json<GenerateSpriteResponse>, ApiErrorResponse> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("generate", request_id = %request_id);

    async move {
        info!(
            "Generate request received: prompt=\"{}\", style={:?}, premium={}",
            request.prompt,
            request.style,
            request.tier().is_premium()
        );

        match state.generator.generate(&request.to_generation_request()).await {
            Ok(delivery) => Ok(Json(GenerateSpriteResponse::from(delivery))),
            Err(e) => {
                warn!("Generate request failed: {}", e);
                Err(ApiErrorResponse {
                    error: ApiError::from(e),
                    request_id: Some(request_id.clone()),
                })
            }
        }
    }
    .instrument(span)
    .await
}
