//! Typed error types for emojivur.
//!
//! Every failure the tool can hit is either an acquisition failure (a font,
//! display, window, canvas or page could not be obtained) or a configuration
//! failure caught before anything was acquired. Both end the run with the
//! same exit code; the message carries the distinguishing detail.

use emojivur_fonts::FontError;
use thiserror::Error;

use crate::config::ConfigError;

/// Process exit code for every fatal error.
pub const EXIT_FAILURE: u8 = 1;

/// Which side of the taxonomy an error falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A handle from an external library could not be obtained.
    Acquisition,
    /// Invalid arguments or configuration, detected before acquiring anything.
    Configuration,
}

/// Top-level error type for a run.
#[derive(Debug, Error)]
pub enum EmojivurError {
    // -----------------------------------------------------------------------
    // Acquisition
    // -----------------------------------------------------------------------
    /// The font could not be loaded or shaped with.
    #[error(transparent)]
    Font(#[from] FontError),

    /// The windowing system's event loop could not be created or failed.
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// No display could be queried for its resolution.
    #[error("Display query failed: {0}")]
    Display(String),

    /// The window could not be created.
    #[error("Window could not be created: {0}")]
    Window(String),

    /// The pixel canvas or the surface presenting it could not be created.
    #[error("Canvas creation failed: {0}")]
    Canvas(String),

    /// The output document could not be created.
    #[error("Page creation failed for '{path}': {source}")]
    PageCreate {
        /// Destination file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The finished document could not be written out.
    #[error("Page write failed for '{path}': {source}")]
    PageWrite {
        /// Destination file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------
    /// The configuration file or a command-line value is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EmojivurError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EmojivurError::Config(_) => ErrorCategory::Configuration,
            _ => ErrorCategory::Acquisition,
        }
    }

    /// Exit code reported to the shell. Failures are not differentiated.
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

impl From<softbuffer::SoftBufferError> for EmojivurError {
    fn from(e: softbuffer::SoftBufferError) -> Self {
        EmojivurError::Canvas(e.to_string())
    }
}

impl From<winit::error::OsError> for EmojivurError {
    fn from(e: winit::error::OsError) -> Self {
        EmojivurError::Window(e.to_string())
    }
}
