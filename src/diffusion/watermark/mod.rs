// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Free-tier watermark compositor
//!
//! Overlays the brand string as a repeating diagonal pattern on top of the
//! source image. Sizing follows the source width:
//! `font_size = max(24, width / 16)`, tiles of `(12 × font_size) × (6 × font_size)`,
//! rotated −30° at 40% white. The output keeps the source dimensions and
//! encoding format, and is byte-stable for identical input.

pub mod glyphs;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

use glyphs::{GlyphLine, GLYPH_HEIGHT};

pub const WATERMARK_TEXT: &str = "AI Sprite Generator";
pub const WATERMARK_OPACITY: f64 = 0.4;
pub const WATERMARK_ROTATION_DEGREES: f64 = -30.0;

/// Sizing used when the source reports no usable dimensions
pub const FALLBACK_DIMENSION: u32 = 512;
const MIN_FONT_SIZE: u32 = 24;

/// Maximum accepted source size (10MB)
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Glyph cells per font-size unit: glyphs are 0.7em tall and advance 0.6em
const CELLS_PER_EM: f64 = 10.0;

/// Image-processing failures; always recovered by the delivery router
#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),
}

/// Watermark geometry for one source image
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    pub text: &'static str,
    pub opacity: f64,
    pub font_size: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub rotation_degrees: f64,
}

impl WatermarkSpec {
    /// Derive the pattern from source pixel dimensions
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        let width = if width == 0 || height == 0 {
            FALLBACK_DIMENSION
        } else {
            width
        };
        let font_size = MIN_FONT_SIZE.max(width / 16);
        Self {
            text: WATERMARK_TEXT,
            opacity: WATERMARK_OPACITY,
            font_size,
            tile_width: font_size * 12,
            tile_height: font_size * 6,
            rotation_degrees: WATERMARK_ROTATION_DEGREES,
        }
    }
}

/// Re-encoded watermarked image
#[derive(Debug, Clone)]
pub struct WatermarkedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl WatermarkedImage {
    pub fn mime_type(&self) -> &'static str {
        format_to_mime(self.format)
    }

    /// Self-contained `data:` URL for inline delivery
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

/// Watermarking seam used by the delivery router
pub trait Watermarker: Send + Sync {
    fn apply(&self, bytes: &[u8]) -> Result<WatermarkedImage, WatermarkError>;
}

/// Brand watermark with the fixed product text
#[derive(Debug, Clone, Copy, Default)]
pub struct BrandWatermark;

impl Watermarker for BrandWatermark {
    fn apply(&self, bytes: &[u8]) -> Result<WatermarkedImage, WatermarkError> {
        apply_watermark(bytes)
    }
}

/// Decode `bytes`, composite the brand pattern and re-encode in the same format
pub fn apply_watermark(bytes: &[u8]) -> Result<WatermarkedImage, WatermarkError> {
    if bytes.is_empty() {
        return Err(WatermarkError::EmptyData);
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(WatermarkError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    let format = image::guess_format(bytes).map_err(|_| WatermarkError::UnsupportedFormat)?;
    let source = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| WatermarkError::DecodeFailed(e.to_string()))?;

    let spec = WatermarkSpec::for_dimensions(source.width(), source.height());
    let has_alpha = source.color().has_alpha();

    let mut canvas = source.to_rgba8();
    composite_pattern(&mut canvas, &spec);

    let (width, height) = canvas.dimensions();
    let output = if has_alpha {
        DynamicImage::ImageRgba8(canvas)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
    };

    let mut cursor = Cursor::new(Vec::new());
    output
        .write_to(&mut cursor, format)
        .map_err(|e| WatermarkError::EncodeFailed(e.to_string()))?;

    Ok(WatermarkedImage {
        bytes: cursor.into_inner(),
        format,
        width,
        height,
    })
}

/// Blend the rotated, tiled text pattern over every pixel of `canvas`
pub fn composite_pattern(canvas: &mut RgbaImage, spec: &WatermarkSpec) {
    let line = GlyphLine::new(spec.text);
    let scale = spec.font_size as f64 / CELLS_PER_EM;
    // Baseline sits at y = font_size within each tile
    let text_top = spec.font_size as f64 - GLYPH_HEIGHT as f64 * scale;
    let text_width = line.width_cells() as f64 * scale;
    let tile_w = spec.tile_width as f64;
    let tile_h = spec.tile_height as f64;

    let theta = spec.rotation_degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let alpha = spec.opacity;

    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let px = x as f64 + 0.5;
        let py = y as f64 + 0.5;

        // Map canvas coordinates back into unrotated pattern space
        let u = px * cos + py * sin;
        let v = -px * sin + py * cos;
        let tu = u.rem_euclid(tile_w);
        let tv = v.rem_euclid(tile_h) - text_top;

        if tv < 0.0 || tu >= text_width {
            continue;
        }
        let col = (tu / scale).floor() as u32;
        let row = (tv / scale).floor() as u32;
        if line.is_set(col, row) {
            blend_white(pixel, alpha);
        }
    }
}

/// Source-over composite of white at `alpha` onto a straight-alpha pixel
fn blend_white(pixel: &mut Rgba<u8>, alpha: f64) {
    let [r, g, b, a] = pixel.0;
    let dst_a = a as f64 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return;
    }
    let over = |c: u8| {
        let c = (alpha + (c as f64 / 255.0) * dst_a * (1.0 - alpha)) / out_a;
        (c * 255.0).round().clamp(0.0, 255.0) as u8
    };
    pixel.0 = [over(r), over(g), over(b), (out_a * 255.0).round() as u8];
}

/// MIME type for a detected format
pub fn format_to_mime(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => "application/octet-stream",
    }
}
