//! One run of emojivur: load, shape, lay out, hand to a sink.

use emojivur_fonts::{LoadedFont, ShapedRun, TextShaper};

use crate::cli::{OutputTarget, RunOptions};
use crate::error::EmojivurError;
use crate::layout::{OutputMode, RenderSpec, layout};
use crate::resources::{ResourceKind, ResourceOwner};
use crate::sink::screen::ScreenSettings;
use crate::sink::{DocumentSink, ScreenSink};

/// Main application
pub struct App {
    options: RunOptions,
    owner: ResourceOwner,
}

impl App {
    pub fn new(options: RunOptions) -> Self {
        Self::with_owner(options, ResourceOwner::new())
    }

    /// Use a caller-supplied owner so its ledger can be inspected afterwards.
    pub fn with_owner(options: RunOptions, owner: ResourceOwner) -> Self {
        Self { options, owner }
    }

    pub fn owner(&self) -> &ResourceOwner {
        &self.owner
    }

    /// Run to completion. Every handle acquired here is released before
    /// this returns, whether it succeeds or not.
    pub fn run(&self) -> Result<(), EmojivurError> {
        let options = &self.options;

        let font = self.owner.acquire(ResourceKind::Font, || {
            LoadedFont::load(&options.font, options.face_index)
        })?;
        log::info!("Loaded {:?}", *font);

        let run = self.owner.acquire(ResourceKind::ShapingBuffer, || {
            TextShaper::new().shape(&font, &options.text, options.pxsize)
        })?;
        log_shaping(&run);

        match &options.target {
            OutputTarget::Document(path) => {
                let placed = layout(&run.glyphs, run.pxsize, OutputMode::Print);
                log::info!(
                    "Page {}x{} (margin {})",
                    placed.viewport.width,
                    placed.viewport.height,
                    placed.margins.x
                );
                let spec = self.owner.track(
                    ResourceKind::GlyphArray,
                    RenderSpec::new(&font, placed, run.pxsize),
                );
                DocumentSink::new(path, options.print_scale, options.paint_color)
                    .render(&self.owner, &spec)
            }
            OutputTarget::Screen => {
                let settings = ScreenSettings {
                    min_window: options.min_window,
                    background: options.background_color,
                    paint_color: options.paint_color,
                };
                ScreenSink::new(&font, &run.glyphs, run.pxsize, settings, self.owner.clone())
                    .run()
            }
        }
    }
}

/// Report what the shaper produced.
fn log_shaping(run: &ShapedRun) {
    let width: i32 = run.glyphs.iter().map(|g| g.x_advance.to_px()).sum();
    let height = run
        .glyphs
        .iter()
        .map(|g| g.y_advance.to_px())
        .max()
        .unwrap_or(0)
        .max(run.pxsize as i32);
    log::info!(
        "Shaped {} glyphs from {} graphemes, text {}x{} px",
        run.glyphs.len(),
        run.grapheme_count,
        width,
        height
    );
    for (i, glyph) in run.glyphs.iter().enumerate() {
        log::debug!(
            "glyph[{}] id={} cluster={} advance=({}, {}) offset=({}, {})",
            i,
            glyph.glyph_id,
            glyph.cluster,
            glyph.x_advance,
            glyph.y_advance,
            glyph.x_offset,
            glyph.y_offset
        );
    }
}
