// Library exports for testing and potential library use

/// Application version, also written into generated documents.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod painter;
pub mod resources;
pub mod sink;

pub use error::EmojivurError;
