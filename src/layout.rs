//! Glyph layout: from shaped advances to a sized viewport and absolute glyph
//! positions.
//!
//! The computation runs in three steps:
//! 1. Content extent: the sum of horizontal advances and the tallest vertical
//!    advance, floored at the glyph pixel size.
//! 2. Viewport size: interactive windows get a full glyph of margin, are
//!    clamped to the display and never drop below a minimum size; print pages
//!    get a 1/64 glyph margin and fit the content exactly.
//! 3. Coordinate translation: pen positions move into the viewport, centered
//!    on screen or anchored to the page's bottom margin for print.
//!
//! Every function here is pure. The canvas y axis grows downward in both
//! modes, so shaped offsets (positive upward) are negated.

use emojivur_fonts::{LoadedFont, ShapedGlyph};

use crate::config::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH};

/// Size of a window or page in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Resolution of the display the window will open on, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayResolution {
    pub width: u32,
    pub height: u32,
}

/// Where the layout is going. Decides both sizing policy and placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// On-screen window, bounded by the display and a minimum window size.
    Interactive {
        display: DisplayResolution,
        min_window: Viewport,
    },
    /// Single page sized to the content.
    Print,
}

impl OutputMode {
    /// Interactive mode with the default minimum window size.
    pub fn interactive(display: DisplayResolution) -> Self {
        OutputMode::Interactive {
            display,
            min_window: Viewport::new(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT),
        }
    }
}

/// Space the shaped text occupies, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentExtent {
    pub width: u32,
    pub height: u32,
}

/// Padding added around the content on each axis (total, not per side).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub x: u32,
    pub y: u32,
}

/// A glyph and the absolute canvas position of its pen origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    pub glyph_id: u32,
    pub x: f32,
    pub y: f32,
}

/// Result of laying out one shaped run.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub extent: ContentExtent,
    pub margins: Margins,
    pub viewport: Viewport,
    pub glyphs: Vec<PositionedGlyph>,
}

/// Everything a sink needs to draw: canvas size, font, placed glyphs, size.
#[derive(Debug, Clone)]
pub struct RenderSpec<'f> {
    pub viewport: Viewport,
    pub font: &'f LoadedFont,
    pub glyphs: Vec<PositionedGlyph>,
    pub pxsize: u32,
}

impl<'f> RenderSpec<'f> {
    pub fn new(font: &'f LoadedFont, layout: Layout, pxsize: u32) -> Self {
        Self {
            viewport: layout.viewport,
            font,
            glyphs: layout.glyphs,
            pxsize,
        }
    }
}

/// Lay out `glyphs` for `mode`.
pub fn layout(glyphs: &[ShapedGlyph], pxsize: u32, mode: OutputMode) -> Layout {
    let extent = content_extent(glyphs, pxsize);
    let margins = margins(mode, pxsize);
    let viewport = viewport(mode, extent, margins);

    let mut positioned = pen_positions(glyphs);
    translate(&mut positioned, mode, extent, margins, viewport);

    Layout {
        extent,
        margins,
        viewport,
        glyphs: positioned,
    }
}

/// Sum of truncated horizontal advances; height is the tallest truncated
/// vertical advance but never less than `pxsize`.
pub fn content_extent(glyphs: &[ShapedGlyph], pxsize: u32) -> ContentExtent {
    let width: i64 = glyphs
        .iter()
        .map(|glyph| i64::from(glyph.x_advance.to_px()))
        .sum();
    let tallest = glyphs
        .iter()
        .map(|glyph| i64::from(glyph.y_advance.to_px()))
        .max()
        .unwrap_or(0);
    let height = tallest.max(i64::from(pxsize));

    ContentExtent {
        width: clamp_to_u32(width),
        height: clamp_to_u32(height),
    }
}

pub fn margins(mode: OutputMode, pxsize: u32) -> Margins {
    match mode {
        OutputMode::Interactive { .. } => Margins {
            x: pxsize,
            y: pxsize,
        },
        OutputMode::Print => {
            // round(pxsize / 64), half away from zero
            let margin = pxsize.saturating_add(32) / 64;
            Margins {
                x: margin,
                y: margin,
            }
        }
    }
}

pub fn viewport(mode: OutputMode, extent: ContentExtent, margins: Margins) -> Viewport {
    let wanted_width = extent.width.saturating_add(margins.x);
    let wanted_height = extent.height.saturating_add(margins.y);

    match mode {
        OutputMode::Interactive {
            display,
            min_window,
        } => Viewport {
            width: wanted_width.min(display.width).max(min_window.width),
            height: wanted_height.min(display.height).max(min_window.height),
        },
        // Zero only for an empty run below 32px; a page needs some area
        OutputMode::Print => Viewport {
            width: wanted_width.max(1),
            height: wanted_height.max(1),
        },
    }
}

/// Raw pen positions, starting at the origin with y pointing down.
///
/// The pen moves by whole-pixel advances; offsets keep their fractions.
pub fn pen_positions(glyphs: &[ShapedGlyph]) -> Vec<PositionedGlyph> {
    let mut pen_x: i32 = 0;
    let mut pen_y: i32 = 0;

    glyphs
        .iter()
        .map(|glyph| {
            let positioned = PositionedGlyph {
                glyph_id: glyph.glyph_id,
                x: pen_x as f32 + glyph.x_offset.to_px_f32(),
                y: -(pen_y as f32 + glyph.y_offset.to_px_f32()),
            };
            pen_x = pen_x.saturating_add(glyph.x_advance.to_px());
            pen_y = pen_y.saturating_add(glyph.y_advance.to_px());
            positioned
        })
        .collect()
}

/// Move pen positions into the viewport. Halves use integer division.
pub fn translate(
    glyphs: &mut [PositionedGlyph],
    mode: OutputMode,
    extent: ContentExtent,
    margins: Margins,
    viewport: Viewport,
) {
    let (dx, dy) = match mode {
        OutputMode::Interactive { .. } => (
            i64::from(viewport.width / 2) - i64::from(extent.width / 2),
            i64::from(viewport.height / 2) + i64::from(margins.y / 2),
        ),
        OutputMode::Print => (
            i64::from(margins.x / 2),
            i64::from(viewport.height) - i64::from(margins.y / 2),
        ),
    };

    for glyph in glyphs {
        glyph.x += dx as f32;
        glyph.y += dy as f32;
    }
}

fn clamp_to_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use emojivur_fonts::Fixed26_6;

    const DISPLAY: DisplayResolution = DisplayResolution {
        width: 1920,
        height: 1080,
    };

    fn glyph(x_advance: i32, y_advance: i32) -> ShapedGlyph {
        ShapedGlyph {
            glyph_id: 7,
            cluster: 0,
            x_advance: Fixed26_6::from_raw(x_advance),
            y_advance: Fixed26_6::from_raw(y_advance),
            x_offset: Fixed26_6::ZERO,
            y_offset: Fixed26_6::ZERO,
        }
    }

    #[test]
    fn test_content_width_truncates_each_advance() {
        // 100/64 = 1.56 -> 1, twice
        let extent = content_extent(&[glyph(100, 0), glyph(100, 0)], 10);
        assert_eq!(extent.width, 2);
    }

    #[test]
    fn test_content_height_floor() {
        assert_eq!(content_extent(&[glyph(64, 0)], 20).height, 20);
        assert_eq!(content_extent(&[glyph(64, 64 * 50)], 20).height, 50);
        assert_eq!(content_extent(&[glyph(64, -64 * 50)], 20).height, 20);
    }

    #[test]
    fn test_negative_advances_do_not_underflow() {
        let extent = content_extent(&[glyph(-640, 0)], 20);
        assert_eq!(extent.width, 0);
    }

    #[test]
    fn test_print_margin_rounds() {
        assert_eq!(margins(OutputMode::Print, 31).x, 0);
        assert_eq!(margins(OutputMode::Print, 32).x, 1);
        assert_eq!(margins(OutputMode::Print, 95).y, 1);
        assert_eq!(margins(OutputMode::Print, 96).y, 2);
        assert_eq!(margins(OutputMode::Print, 640).x, 10);
    }

    #[test]
    fn test_interactive_margin_is_pxsize() {
        let mode = OutputMode::interactive(DISPLAY);
        assert_eq!(margins(mode, 20), Margins { x: 20, y: 20 });
    }

    #[test]
    fn test_interactive_clamps_to_display() {
        let mode = OutputMode::interactive(DisplayResolution {
            width: 800,
            height: 600,
        });
        let glyphs = vec![glyph(64 * 500, 0); 4];
        let result = layout(&glyphs, 100, mode);
        assert_eq!(result.extent.width, 2000);
        assert_eq!(result.viewport.width, 800);
        // 100 + 100 margin is below the minimum height
        assert_eq!(result.viewport.height, 240);
    }

    #[test]
    fn test_minimum_wins_over_small_display() {
        let mode = OutputMode::Interactive {
            display: DisplayResolution {
                width: 100,
                height: 100,
            },
            min_window: Viewport::new(320, 240),
        };
        let result = layout(&[glyph(640, 0)], 20, mode);
        assert_eq!(result.viewport, Viewport::new(320, 240));
    }

    #[test]
    fn test_pen_positions_accumulate() {
        let mut second = glyph(640, 0);
        second.x_offset = Fixed26_6::from_raw(32);
        second.y_offset = Fixed26_6::from_raw(128);
        let positions = pen_positions(&[glyph(640, 0), second, glyph(640, 0)]);

        assert_eq!(positions[0].x, 0.0);
        assert_eq!(positions[1].x, 10.5);
        assert_eq!(positions[1].y, -2.0);
        assert_eq!(positions[2].x, 20.0);
        assert_eq!(positions[2].y, 0.0);
    }

    #[test]
    fn test_vertical_advance_moves_pen_up() {
        let positions = pen_positions(&[glyph(0, 640), glyph(0, 0)]);
        assert_eq!(positions[1].y, -10.0);
    }

    #[test]
    fn test_interactive_centering_offsets() {
        let result = layout(&[glyph(640, 0), glyph(640, 0)], 20, OutputMode::interactive(DISPLAY));
        // viewport 320x240, content 20 wide
        assert_eq!(result.glyphs[0].x, 160.0 - 10.0);
        assert_eq!(result.glyphs[1].x, 160.0);
        assert_eq!(result.glyphs[0].y, 120.0 + 10.0);
    }

    #[test]
    fn test_print_offsets() {
        let result = layout(&[glyph(640, 0), glyph(640, 0)], 640, OutputMode::Print);
        assert_eq!(result.viewport, Viewport::new(30, 650));
        assert_eq!(result.glyphs[0].x, 5.0);
        assert_eq!(result.glyphs[1].x, 15.0);
        assert_eq!(result.glyphs[0].y, 645.0);
    }

    #[test]
    fn test_print_empty_small_text_has_area() {
        let result = layout(&[], 20, OutputMode::Print);
        assert_eq!(result.viewport, Viewport::new(1, 20));
    }

    #[test]
    fn prop_content_width_is_sum_of_truncated_advances() {
        fn prop(advances: Vec<u16>, pxsize: u16) -> bool {
            let glyphs: Vec<ShapedGlyph> =
                advances.iter().map(|&a| glyph(i32::from(a), 0)).collect();
            let expected: u32 = advances.iter().map(|&a| u32::from(a) / 64).sum();
            content_extent(&glyphs, u32::from(pxsize)).width == expected
        }
        quickcheck::quickcheck(prop as fn(Vec<u16>, u16) -> bool);
    }

    #[test]
    fn prop_content_height_is_max_of_pxsize_and_advances() {
        fn prop(advances: Vec<u16>, pxsize: u16) -> bool {
            let glyphs: Vec<ShapedGlyph> =
                advances.iter().map(|&a| glyph(0, i32::from(a))).collect();
            let tallest = advances.iter().map(|&a| u32::from(a) / 64).max().unwrap_or(0);
            content_extent(&glyphs, u32::from(pxsize)).height == tallest.max(u32::from(pxsize))
        }
        quickcheck::quickcheck(prop as fn(Vec<u16>, u16) -> bool);
    }

    #[test]
    fn prop_interactive_viewport_within_bounds() {
        fn prop(advances: Vec<u16>, pxsize: u8, width: u16, height: u16) -> bool {
            let pxsize = u32::from(pxsize).max(1);
            let display = DisplayResolution {
                width: u32::from(width).max(MIN_WINDOW_WIDTH),
                height: u32::from(height).max(MIN_WINDOW_HEIGHT),
            };
            let glyphs: Vec<ShapedGlyph> =
                advances.iter().map(|&a| glyph(i32::from(a), 0)).collect();
            let result = layout(&glyphs, pxsize, OutputMode::interactive(display));
            result.viewport.width >= MIN_WINDOW_WIDTH
                && result.viewport.width <= display.width
                && result.viewport.height >= MIN_WINDOW_HEIGHT
                && result.viewport.height <= display.height
        }
        quickcheck::quickcheck(prop as fn(Vec<u16>, u8, u16, u16) -> bool);
    }

    #[test]
    fn prop_print_viewport_is_content_plus_margin() {
        fn prop(advances: Vec<u16>, pxsize: u16) -> bool {
            let pxsize = u32::from(pxsize).max(32);
            let glyphs: Vec<ShapedGlyph> =
                advances.iter().map(|&a| glyph(i32::from(a), 0)).collect();
            let result = layout(&glyphs, pxsize, OutputMode::Print);
            result.viewport.width == result.extent.width + result.margins.x
                && result.viewport.height == result.extent.height + result.margins.y
        }
        quickcheck::quickcheck(prop as fn(Vec<u16>, u16) -> bool);
    }

    #[test]
    fn prop_layout_is_deterministic() {
        fn prop(advances: Vec<(i16, i16)>, pxsize: u16, print: bool) -> bool {
            let glyphs: Vec<ShapedGlyph> = advances
                .iter()
                .map(|&(x, y)| glyph(i32::from(x), i32::from(y)))
                .collect();
            let mode = if print {
                OutputMode::Print
            } else {
                OutputMode::interactive(DISPLAY)
            };
            let first = layout(&glyphs, u32::from(pxsize), mode);
            let second = layout(&glyphs, u32::from(pxsize), mode);
            first == second
                && first
                    .glyphs
                    .iter()
                    .zip(&second.glyphs)
                    .all(|(a, b)| a.x.to_bits() == b.x.to_bits() && a.y.to_bits() == b.y.to_bits())
        }
        quickcheck::quickcheck(prop as fn(Vec<(i16, i16)>, u16, bool) -> bool);
    }
}
