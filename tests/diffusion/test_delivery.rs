// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tier-based delivery and the free-tier fallback

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use sprite_generator::diffusion::watermark::WatermarkedImage;
use sprite_generator::diffusion::{
    AssetFetcher, DeliveryRouter, DownloadError, Tier, WatermarkError, Watermarker,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const ASSET_URL: &str = "https://cdn.example/sheet.png";

struct StaticFetcher {
    response: Result<Vec<u8>, u16>,
    calls: AtomicU32,
}

impl StaticFetcher {
    fn ok(bytes: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(bytes),
            calls: AtomicU32::new(0),
        })
    }

    fn status(code: u16) -> Arc<Self> {
        Arc::new(Self {
            response: Err(code),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl AssetFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map_err(DownloadError::Status)
    }
}

struct BrokenWatermarker;

impl Watermarker for BrokenWatermarker {
    fn apply(&self, _bytes: &[u8]) -> Result<WatermarkedImage, WatermarkError> {
        Err(WatermarkError::EncodeFailed("encoder unavailable".to_string()))
    }
}

fn small_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(96, 96, Rgb([30, 30, 30]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

#[tokio::test]
async fn test_premium_gets_original_url_without_download() {
    let fetcher = StaticFetcher::ok(small_png());
    let router = DeliveryRouter::new(fetcher.clone());

    let delivery = router.deliver(ASSET_URL, Tier::Premium).await;

    assert_eq!(delivery.image_url, ASSET_URL);
    assert_eq!(delivery.watermarked, None);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

    let json = serde_json::to_value(&delivery).unwrap();
    assert!(json.get("watermarked").is_none());
}

#[tokio::test]
async fn test_free_gets_inline_watermarked_image() {
    let fetcher = StaticFetcher::ok(small_png());
    let router = DeliveryRouter::new(fetcher.clone());

    let delivery = router.deliver(ASSET_URL, Tier::Free).await;

    assert!(delivery.is_inline());
    assert!(delivery.image_url.starts_with("data:image/png;base64,"));
    assert_eq!(delivery.watermarked, Some(true));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_free_falls_back_when_download_fails() {
    let router = DeliveryRouter::new(StaticFetcher::status(403));

    let delivery = router.deliver(ASSET_URL, Tier::Free).await;

    assert_eq!(delivery.image_url, ASSET_URL);
    assert_eq!(delivery.watermarked, Some(false));
}

#[tokio::test]
async fn test_free_falls_back_when_watermark_fails() {
    let router = DeliveryRouter::with_watermarker(
        StaticFetcher::ok(small_png()),
        Arc::new(BrokenWatermarker),
    );

    let delivery = router.deliver(ASSET_URL, Tier::Free).await;

    assert_eq!(delivery.image_url, ASSET_URL);
    assert_eq!(delivery.watermarked, Some(false));
    assert!(!delivery.is_inline());
}

#[tokio::test]
async fn test_free_falls_back_on_undecodable_asset() {
    let router = DeliveryRouter::new(StaticFetcher::ok(b"not an image".to_vec()));
    let delivery = router.deliver(ASSET_URL, Tier::Free).await;
    assert_eq!(delivery.watermarked, Some(false));
}
