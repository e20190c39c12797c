// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod generate_sprite;
pub mod http_server;

pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use generate_sprite::{generate_sprite_handler, GenerateSpriteRequest, GenerateSpriteResponse};
pub use http_server::{create_app, start_server, AppState, HealthResponse};
