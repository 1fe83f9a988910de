//! Output sinks. Each takes a laid-out [`RenderSpec`](crate::layout::RenderSpec)
//! and draws it somewhere.
//!
//! - [`screen`]: an event-driven window sized to the text.
//! - [`document`]: a single-page PDF sized to the text.

pub mod document;
pub mod screen;

pub use document::{DocumentSink, encode_page};
pub use screen::ScreenSink;
