//! PDF output.
//!
//! The page is sized to the viewport in points. Glyphs are rasterized at
//! `print_scale` pixels per point and embedded as one Flate-compressed RGB
//! image with a grayscale soft mask, so color emoji print the same way they
//! show on screen. Large pages get a lower scale so the raster stays within
//! `MAX_RASTER_PIXELS`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use tiny_skia::Pixmap;

use crate::error::EmojivurError;
use crate::layout::{RenderSpec, Viewport};
use crate::painter::{DeviceScale, Painter};
use crate::resources::{ResourceKind, ResourceOwner};

const IMAGE_NAME: Name<'static> = Name(b"Im1");

/// Value of the document's Creator entry.
pub fn creator() -> String {
    format!("emojivur v{}", env!("CARGO_PKG_VERSION"))
}

/// Writes one page to a PDF file.
pub struct DocumentSink {
    path: PathBuf,
    print_scale: u32,
    paint_color: [u8; 4],
}

impl DocumentSink {
    pub fn new(path: impl Into<PathBuf>, print_scale: u32, paint_color: [u8; 4]) -> Self {
        Self {
            path: path.into(),
            print_scale: print_scale.max(1),
            paint_color,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Draw the glyphs, then create the file and write the finished document.
    ///
    /// The canvas is acquired before the page and released after it, so a
    /// page that cannot be rasterized leaves no file behind.
    pub fn render(&self, owner: &ResourceOwner, spec: &RenderSpec<'_>) -> Result<(), EmojivurError> {
        let path = self.path.display().to_string();
        log::info!(
            "Writing {}x{} page to {}",
            spec.viewport.width,
            spec.viewport.height,
            path
        );

        let scale = raster_scale(spec.viewport, self.print_scale)?;
        if scale < self.print_scale {
            log::warn!(
                "Print scale reduced from {} to {} to fit the raster budget",
                self.print_scale,
                scale
            );
        }

        let mut canvas = owner.acquire(ResourceKind::Canvas, || canvas_for(spec.viewport, scale))?;

        let drawn =
            Painter::new(self.paint_color).paint(&mut canvas, spec, DeviceScale::uniform(scale as f32));
        log::debug!("Painted {} of {} glyphs", drawn, spec.glyphs.len());

        let bytes = encode_page(&canvas, spec.viewport, &creator()).map_err(|source| {
            EmojivurError::PageWrite {
                path: path.clone(),
                source,
            }
        })?;

        let mut page = owner
            .acquire(ResourceKind::Page, || File::create(&self.path))
            .map_err(|source| EmojivurError::PageCreate {
                path: path.clone(),
                source,
            })?;
        page.write_all(&bytes)
            .and_then(|()| page.flush())
            .map_err(|source| EmojivurError::PageWrite {
                path: path.clone(),
                source,
            })?;

        log::info!("Wrote {} bytes to {}", bytes.len(), path);
        Ok(())
    }
}

/// Largest page raster, in pixels (256 MiB of RGBA).
pub const MAX_RASTER_PIXELS: u64 = 64 * 1024 * 1024;

/// Highest scale up to `requested` whose raster fits `MAX_RASTER_PIXELS`.
pub fn raster_scale(viewport: Viewport, requested: u32) -> Result<u32, EmojivurError> {
    let area = u64::from(viewport.width) * u64::from(viewport.height);
    (1..=requested.max(1))
        .rev()
        .find(|&scale| area.saturating_mul(u64::from(scale) * u64::from(scale)) <= MAX_RASTER_PIXELS)
        .ok_or_else(|| {
            EmojivurError::Canvas(format!(
                "{}x{} page exceeds the {} pixel raster limit",
                viewport.width, viewport.height, MAX_RASTER_PIXELS
            ))
        })
}

fn canvas_for(viewport: Viewport, scale: u32) -> Result<Pixmap, EmojivurError> {
    let width = viewport.width.checked_mul(scale);
    let height = viewport.height.checked_mul(scale);
    width
        .zip(height)
        .and_then(|(width, height)| Pixmap::new(width, height))
        .ok_or_else(|| {
            EmojivurError::Canvas(format!(
                "{}x{} page at scale {} is too large",
                viewport.width, viewport.height, scale
            ))
        })
}

/// Serialize a single-page PDF showing `pixmap` over a `viewport`-sized page.
pub fn encode_page(pixmap: &Pixmap, viewport: Viewport, creator: &str) -> io::Result<Vec<u8>> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let mask_id = Ref::new(5);
    let content_id = Ref::new(6);
    let info_id = Ref::new(7);

    let width = viewport.width as f32;
    let height = viewport.height as f32;

    let (rgb, alpha) = split_channels(pixmap);
    let rgb = deflate(&rgb)?;
    let alpha = deflate(&alpha)?;

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, width, height));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(IMAGE_NAME, image_id);
    page.finish();

    let mut image = pdf.image_xobject(image_id, &rgb);
    image.filter(Filter::FlateDecode);
    image.width(pixmap.width() as i32);
    image.height(pixmap.height() as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.s_mask(mask_id);
    image.finish();

    let mut mask = pdf.image_xobject(mask_id, &alpha);
    mask.filter(Filter::FlateDecode);
    mask.width(pixmap.width() as i32);
    mask.height(pixmap.height() as i32);
    mask.color_space().device_gray();
    mask.bits_per_component(8);
    mask.finish();

    // Stretch the unit-square image over the page
    let mut content = Content::new();
    content.save_state();
    content.transform([width, 0.0, 0.0, height, 0.0, 0.0]);
    content.x_object(IMAGE_NAME);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    pdf.document_info(info_id).creator(TextStr(creator));

    Ok(pdf.finish())
}

/// Straight RGB and alpha planes from a premultiplied pixmap.
fn split_channels(pixmap: &Pixmap) -> (Vec<u8>, Vec<u8>) {
    let count = pixmap.pixels().len();
    let mut rgb = Vec::with_capacity(count * 3);
    let mut alpha = Vec::with_capacity(count);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgb.extend_from_slice(&[color.red(), color.green(), color.blue()]);
        alpha.push(color.alpha());
    }
    (rgb, alpha)
}

fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|window| window == needle)
    }

    #[test]
    fn test_creator_names_version() {
        assert_eq!(creator(), format!("emojivur v{}", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_encode_page_structure() {
        let pixmap = Pixmap::new(30, 65).unwrap();
        let bytes = encode_page(&pixmap, Viewport::new(30, 65), "emojivur v9").unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"/MediaBox"));
        assert!(contains(&bytes, b"/FlateDecode"));
        assert!(contains(&bytes, b"/SMask"));
        assert!(contains(&bytes, b"emojivur v9"));
        assert!(contains(&bytes, b"%%EOF"));
    }

    #[test]
    fn test_split_channels_demultiplies() {
        let mut pixmap = Pixmap::new(1, 1).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(255, 0, 0, 128));
        let (rgb, alpha) = split_channels(&pixmap);
        assert_eq!(alpha, vec![128]);
        assert_eq!(rgb[1..], [0, 0]);
        assert!(rgb[0] >= 254);
    }

    #[test]
    fn test_raster_scale_keeps_requested_when_it_fits() {
        assert_eq!(raster_scale(Viewport::new(77, 65), 4).unwrap(), 4);
        assert_eq!(raster_scale(Viewport::new(77, 65), 16).unwrap(), 16);
    }

    #[test]
    fn test_raster_scale_reduced_for_large_page() {
        // 6M points: 96M pixels at 4x, 54M at 3x
        assert_eq!(raster_scale(Viewport::new(3000, 2000), 4).unwrap(), 3);
        assert_eq!(raster_scale(Viewport::new(8000, 8000), 4).unwrap(), 1);
    }

    #[test]
    fn test_raster_scale_rejects_page_over_budget() {
        // "AB" at 10000px
        let result = raster_scale(Viewport::new(12196, 10156), 4);
        assert!(matches!(result, Err(EmojivurError::Canvas(_))));
        assert!(raster_scale(Viewport::new(u32::MAX, u32::MAX), 1).is_err());
    }

    #[test]
    fn test_oversized_canvas_is_an_error() {
        let result = canvas_for(Viewport::new(u32::MAX, 10), 16);
        assert!(matches!(result, Err(EmojivurError::Canvas(_))));
    }
}
