// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sprite generation API endpoint module
//!
//! Provides POST /api/generate for prompt-to-sprite-sheet generation.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::generate_sprite_handler;
pub use request::GenerateSpriteRequest;
pub use response::GenerateSpriteResponse;
