// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::generate_sprite::generate_sprite_handler;
use crate::config::ServerConfig;
use crate::diffusion::SpriteGenerator;
use crate::version;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<SpriteGenerator>,
}

impl AppState {
    pub fn new(generator: SpriteGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether an upstream credential is configured
    pub configured: bool,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/generate", post(generate_sprite_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(
    config: &ServerConfig,
    generator: SpriteGenerator,
) -> anyhow::Result<()> {
    let app = create_app(AppState::new(generator));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::VERSION.to_string(),
        configured: state.generator.is_configured(),
    })
}
