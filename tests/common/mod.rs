//! Shared integration test helpers for emojivur.
//!
//! Include with `mod common;` at the top of a test file. The
//! `#[allow(dead_code)]` below keeps files that use only some helpers quiet.

#![allow(dead_code)]

use emojivur::layout::DisplayResolution;
use emojivur_fonts::{Fixed26_6, LoadedFont, ShapedGlyph};

/// Embedded DejaVu Sans Mono, the font the shaping tests are written against.
pub const TEST_FONT: &[u8] = include_bytes!("../../emojivur-fonts/fonts/DejaVuSansMono.ttf");

pub const TEST_FONT_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/emojivur-fonts/fonts/DejaVuSansMono.ttf"
);

pub const FULL_HD: DisplayResolution = DisplayResolution {
    width: 1920,
    height: 1080,
};

pub fn test_font() -> LoadedFont {
    LoadedFont::from_bytes(TEST_FONT.to_vec(), 0, "DejaVuSansMono.ttf".to_string())
        .expect("embedded font should load")
}

/// A glyph with the given advances in 1/64 pixel units and no offsets.
pub fn glyph(x_advance: i32, y_advance: i32) -> ShapedGlyph {
    ShapedGlyph {
        glyph_id: 36,
        cluster: 0,
        x_advance: Fixed26_6::from_raw(x_advance),
        y_advance: Fixed26_6::from_raw(y_advance),
        x_offset: Fixed26_6::ZERO,
        y_offset: Fixed26_6::ZERO,
    }
}

/// Two glyphs advancing 10px each, the shape of "AB" at a small size.
pub fn ab_glyphs() -> Vec<ShapedGlyph> {
    vec![glyph(640, 0), glyph(640, 0)]
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
