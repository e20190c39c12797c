// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sprite-sheet prompt construction and style presets

use rand::seq::SliceRandom;

/// Maximum prompt length accepted from callers (characters)
pub const MAX_PROMPT_CHARS: usize = 200;

/// Style applied when the caller gives none
pub const DEFAULT_STYLE: &str = "pixel art";

/// A named art style offered to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePreset {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const STYLE_PRESETS: &[StylePreset] = &[
    StylePreset {
        id: "pixel-art",
        label: "Pixel Art",
        description: "Classic 8-bit style",
    },
    StylePreset {
        id: "16-bit",
        label: "16-Bit",
        description: "Retro console era",
    },
    StylePreset {
        id: "vector",
        label: "Vector",
        description: "Clean & scalable",
    },
    StylePreset {
        id: "anime",
        label: "Anime",
        description: "Japanese anime style",
    },
];

pub const EXAMPLE_PROMPTS: &[&str] = &[
    "A brave knight wielding a glowing sword",
    "A cute slime monster bouncing happily",
    "A steampunk robot with brass gears",
    "A mystical forest wizard casting spells",
    "A fierce dragon breathing fire",
];

/// Look up a preset by id or label, ignoring case
pub fn find_preset(style: &str) -> Option<&'static StylePreset> {
    let style = style.trim();
    STYLE_PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(style) || p.label.eq_ignore_ascii_case(style))
}

/// Pick one of the example prompts
pub fn random_example() -> &'static str {
    EXAMPLE_PROMPTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(EXAMPLE_PROMPTS[0])
}

/// Check a caller prompt before any upstream work
pub fn validate_prompt(prompt: &str) -> Result<(), String> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err("prompt must not be empty".to_string());
    }
    let chars = trimmed.chars().count();
    if chars > MAX_PROMPT_CHARS {
        return Err(format!(
            "prompt must be at most {} characters, got {}",
            MAX_PROMPT_CHARS, chars
        ));
    }
    Ok(())
}

/// Wrap the caller prompt in sprite-sheet instructions.
///
/// Preset ids are expanded to their label; any other style text is used
/// verbatim.
pub fn enhance_prompt(prompt: &str, style: Option<&str>) -> String {
    let style = match style.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => find_preset(s).map(|p| p.label).unwrap_or(s),
        None => DEFAULT_STYLE,
    };
    format!(
        "Sprite sheet of {}, {} style, white background, grid layout, consistent character, game asset, high quality, detailed",
        prompt.trim(),
        style
    )
}
