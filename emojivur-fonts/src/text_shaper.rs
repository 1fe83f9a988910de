/// Text shaping module using HarfBuzz via rustybuzz
///
/// Shaping is what turns emoji sequences into the right glyphs:
/// - Regional indicator pairs become a single flag glyph
/// - ZWJ sequences (family, profession emoji) collapse into one glyph
/// - Skin tone modifiers merge with their base emoji
///
/// The configuration is fixed: left-to-right direction, Common script and
/// no language tag, so the result does not depend on the caller's locale.
///
/// # Usage
///
/// ```ignore
/// let font = LoadedFont::load(&FontSource::resolve("NotoColorEmoji.ttf"), 0)?;
/// let run = TextShaper::new().shape(&font, "👋🏽🇮🇹", 109)?;
/// ```
use rustybuzz::{Direction, GlyphBuffer, UnicodeBuffer};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::FontError;
use crate::fixed::Fixed26_6;
use crate::font::LoadedFont;

/// A single shaped glyph with positioning information in 1/64 pixel units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    /// Glyph ID from the font
    pub glyph_id: u32,

    /// Cluster index (byte offset of the input text this glyph came from)
    pub cluster: u32,

    /// Horizontal pen advance
    pub x_advance: Fixed26_6,

    /// Vertical pen advance (usually 0 for horizontal text)
    pub y_advance: Fixed26_6,

    /// Horizontal offset from the current pen position
    pub x_offset: Fixed26_6,

    /// Vertical offset from the baseline, positive upward
    pub y_offset: Fixed26_6,
}

/// Result of shaping a text run
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRun {
    /// The input text that was shaped
    pub text: String,

    /// Pixel size the advances were scaled for
    pub pxsize: u32,

    /// The shaped glyphs, in visual order
    pub glyphs: Vec<ShapedGlyph>,

    /// Number of user-perceived characters in `text`
    pub grapheme_count: usize,
}

impl ShapedRun {
    /// Sum of all horizontal advances
    pub fn total_advance(&self) -> Fixed26_6 {
        self.glyphs
            .iter()
            .fold(Fixed26_6::ZERO, |acc, glyph| acc + glyph.x_advance)
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Text shaper using HarfBuzz via rustybuzz
#[derive(Debug, Default)]
pub struct TextShaper;

impl TextShaper {
    /// Create a new text shaper
    pub fn new() -> Self {
        TextShaper
    }

    /// Detect grapheme clusters in the input text
    ///
    /// Flags, ZWJ sequences and skin tone modifiers each count as one.
    pub fn detect_grapheme_clusters<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        text.grapheme_indices(true).collect()
    }

    /// Shape `text` with `font`, scaling positions for `pxsize` pixels per em.
    ///
    /// The number of glyphs returned is whatever the font's substitution rules
    /// produce, which for emoji sequences is usually fewer than the number of
    /// input characters.
    pub fn shape(
        &self,
        font: &LoadedFont,
        text: &str,
        pxsize: u32,
    ) -> Result<ShapedRun, FontError> {
        let face = font.shaping_face()?;
        let units_per_em = font.units_per_em();

        // Create Unicode buffer and add text
        let mut unicode_buffer = UnicodeBuffer::new();
        unicode_buffer.push_str(text);
        unicode_buffer.set_direction(Direction::LeftToRight);
        unicode_buffer.set_script(rustybuzz::script::COMMON);

        let glyph_buffer = rustybuzz::shape(&face, &[], unicode_buffer);
        let glyphs = self.extract_shaped_glyphs(&glyph_buffer, units_per_em, pxsize);
        let grapheme_count = self.detect_grapheme_clusters(text).len();

        log::debug!(
            "Shaped {} chars ({} graphemes) into {} glyphs at {}px",
            text.chars().count(),
            grapheme_count,
            glyphs.len(),
            pxsize
        );

        Ok(ShapedRun {
            text: text.to_string(),
            pxsize,
            glyphs,
            grapheme_count,
        })
    }

    /// Extract shaped glyphs from HarfBuzz glyph buffer, scaled to 26.6 pixels
    fn extract_shaped_glyphs(
        &self,
        buffer: &GlyphBuffer,
        units_per_em: u16,
        pxsize: u32,
    ) -> Vec<ShapedGlyph> {
        let scale = |units: i32| Fixed26_6::from_font_units(units, units_per_em, pxsize);

        buffer
            .glyph_infos()
            .iter()
            .zip(buffer.glyph_positions().iter())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: info.cluster,
                x_advance: scale(pos.x_advance),
                y_advance: scale(pos.y_advance),
                x_offset: scale(pos.x_offset),
                y_offset: scale(pos.y_offset),
            })
            .collect()
    }
}
