//! Rasterizes placed glyphs onto a tiny-skia pixmap.
//!
//! Both sinks draw through here: the screen sink presents the pixmap in the
//! window, the document sink embeds it in the page. Color sources are tried
//! before outlines so emoji fonts keep their own colors.

use swash::scale::image::{Content, Image};
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::{Format, Vector};
use tiny_skia::{ColorU8, IntSize, Pixmap, PixmapPaint, Transform};

use crate::layout::RenderSpec;

/// Device pixels per layout pixel on each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceScale {
    pub x: f32,
    pub y: f32,
}

impl DeviceScale {
    pub const IDENTITY: DeviceScale = DeviceScale { x: 1.0, y: 1.0 };

    pub fn uniform(scale: f32) -> Self {
        Self { x: scale, y: scale }
    }
}

pub struct Painter {
    context: ScaleContext,
    paint_color: [u8; 4],
}

impl Painter {
    /// `paint_color` is straight RGBA, used for monochrome glyphs.
    pub fn new(paint_color: [u8; 4]) -> Self {
        Self {
            context: ScaleContext::new(),
            paint_color,
        }
    }

    /// Draw every glyph of `spec` onto `pixmap`. Returns how many glyphs
    /// produced visible pixels.
    pub fn paint(&mut self, pixmap: &mut Pixmap, spec: &RenderSpec<'_>, scale: DeviceScale) -> usize {
        let size = spec.pxsize as f32 * scale.y;
        let mut scaler = self
            .context
            .builder(spec.font.render_ref())
            .size(size)
            .hint(true)
            .build();

        let mut drawn = 0;
        for glyph in &spec.glyphs {
            let Ok(glyph_id) = u16::try_from(glyph.glyph_id) else {
                log::warn!("Glyph id {} out of range, skipped", glyph.glyph_id);
                continue;
            };

            let device_x = glyph.x * scale.x;
            let device_y = glyph.y * scale.y;
            let whole_x = device_x.floor();

            let Some(image) = Render::new(&[
                Source::ColorBitmap(StrikeWith::BestFit),
                Source::ColorOutline(0),
                Source::Outline,
            ])
            .format(Format::Alpha)
            .offset(Vector::new(device_x - whole_x, 0.0))
            .render(&mut scaler, glyph_id) else {
                log::debug!("Glyph {} has no image", glyph_id);
                continue;
            };

            let Some(glyph_pixmap) = glyph_pixmap(&image, self.paint_color) else {
                continue;
            };

            let dest_x = whole_x as i32 + image.placement.left;
            let dest_y = device_y.round() as i32 - image.placement.top;
            log::trace!(
                "Glyph {} {}x{} at ({}, {})",
                glyph_id,
                image.placement.width,
                image.placement.height,
                dest_x,
                dest_y
            );
            pixmap.draw_pixmap(
                dest_x,
                dest_y,
                glyph_pixmap.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
            drawn += 1;
        }
        drawn
    }
}

/// Convert a swash image to a premultiplied pixmap. `None` for empty images
/// such as spaces.
fn glyph_pixmap(image: &Image, paint_color: [u8; 4]) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.placement.width, image.placement.height)?;
    let pixels: Vec<u8> = match image.content {
        Content::Mask => image
            .data
            .iter()
            .flat_map(|&coverage| tint(paint_color, coverage))
            .collect(),
        Content::SubpixelMask => subpixel_coverage(image)
            .into_iter()
            .flat_map(|coverage| tint(paint_color, coverage))
            .collect(),
        Content::Color => image
            .data
            .chunks_exact(4)
            .flat_map(|px| {
                let color = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect(),
    };
    Pixmap::from_vec(pixels, size)
}

/// Premultiplied paint color at the given coverage.
fn tint(color: [u8; 4], coverage: u8) -> [u8; 4] {
    let alpha = mul_div_255(color[3], coverage);
    [
        mul_div_255(color[0], alpha),
        mul_div_255(color[1], alpha),
        mul_div_255(color[2], alpha),
        alpha,
    ]
}

fn mul_div_255(a: u8, b: u8) -> u8 {
    ((u32::from(a) * u32::from(b) + 127) / 255) as u8
}

/// Collapse per-channel coverage to one luminance value per pixel.
fn subpixel_coverage(image: &Image) -> Vec<u8> {
    let width = image.placement.width as usize;
    let height = image.placement.height as usize;
    let stride = if width > 0 && height > 0 {
        image.data.len() / (width * height)
    } else {
        0
    };

    match stride {
        3 | 4 => image
            .data
            .chunks_exact(stride)
            .map(|chunk| {
                let (r, g, b) = (chunk[0] as u32, chunk[1] as u32, chunk[2] as u32);
                ((r * 299 + g * 587 + b * 114) / 1000) as u8
            })
            .collect(),
        _ => vec![255; width * height],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{OutputMode, layout};
    use emojivur_fonts::{LoadedFont, TextShaper};

    const TEST_FONT: &[u8] = include_bytes!("../emojivur-fonts/fonts/DejaVuSansMono.ttf");

    fn test_font() -> LoadedFont {
        LoadedFont::from_bytes(TEST_FONT.to_vec(), 0, "DejaVuSansMono.ttf".to_string()).unwrap()
    }

    #[test]
    fn test_tint_premultiplies() {
        assert_eq!(tint([0, 0, 0, 255], 255), [0, 0, 0, 255]);
        assert_eq!(tint([255, 255, 255, 255], 0), [0, 0, 0, 0]);
        assert_eq!(tint([255, 0, 0, 255], 128), [128, 0, 0, 128]);
        assert_eq!(tint([255, 255, 255, 128], 255), [128, 128, 128, 128]);
    }

    #[test]
    fn test_paints_glyphs_into_pixmap() {
        let font = test_font();
        let run = TextShaper::new().shape(&font, "AB", 64).unwrap();
        let placed = layout(&run.glyphs, run.pxsize, OutputMode::Print);
        let spec = RenderSpec::new(&font, placed, run.pxsize);

        let mut pixmap = Pixmap::new(spec.viewport.width, spec.viewport.height).unwrap();
        let drawn = Painter::new([0, 0, 0, 255]).paint(&mut pixmap, &spec, DeviceScale::IDENTITY);

        assert_eq!(drawn, 2);
        assert!(pixmap.pixels().iter().any(|px| px.alpha() > 0));
    }

    #[test]
    fn test_space_draws_nothing() {
        let font = test_font();
        let run = TextShaper::new().shape(&font, " ", 32).unwrap();
        let placed = layout(&run.glyphs, run.pxsize, OutputMode::Print);
        let spec = RenderSpec::new(&font, placed, run.pxsize);

        let mut pixmap = Pixmap::new(spec.viewport.width, spec.viewport.height).unwrap();
        let drawn = Painter::new([0, 0, 0, 255]).paint(&mut pixmap, &spec, DeviceScale::IDENTITY);

        assert_eq!(drawn, 0);
        assert!(pixmap.pixels().iter().all(|px| px.alpha() == 0));
    }
}
