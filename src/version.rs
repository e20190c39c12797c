// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Sprite Generator node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-tiered-watermark-2026-10-18";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-10-18";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "async-task-polling",
    "tiered-delivery",
    "free-tier-watermark",
    "watermark-fallback",
    "inline-data-url",
    "daily-usage-quota",
    "style-presets",
];
