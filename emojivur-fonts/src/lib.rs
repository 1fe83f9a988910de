//! Font loading and text shaping for the emojivur emoji viewer.
//!
//! This crate provides:
//! - Font loading from a file path or a system font family name
//! - Two views over the same font bytes: a shaping view (rustybuzz) and a
//!   rendering view (swash)
//! - HarfBuzz-based text shaping via rustybuzz, fixed to left-to-right
//!   direction and the Common script
//! - A 26.6 fixed-point type for the 1/64 pixel units shaping results use
//!
//! # Architecture
//!
//! `LoadedFont` owns the font data. `TextShaper` borrows it to produce a
//! `ShapedRun`; renderers borrow it through `LoadedFont::render_ref`.
//! Neither view can outlive the `LoadedFont` it came from.

pub mod error;
pub mod fixed;
pub mod font;
pub mod text_shaper;

// Re-export main types for convenience
pub use error::FontError;
pub use fixed::Fixed26_6;
pub use font::{FontSource, LoadedFont};
pub use text_shaper::{ShapedGlyph, ShapedRun, TextShaper};
