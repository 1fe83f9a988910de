//! Typed error types for emojivur-fonts.

use thiserror::Error;

/// Failures while acquiring a font or shaping text with it.
#[derive(Debug, Error)]
pub enum FontError {
    /// The font file exists but could not be read.
    #[error("Font file read failed for '{path}': {source}")]
    Read {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The argument is neither an existing file nor an installed family.
    #[error("Font '{0}' is neither a readable file nor an installed font family")]
    NotFound(String),

    /// The bytes were read but do not parse as a font face.
    #[error("Font data from '{name}' could not be parsed (face index {index})")]
    Parse {
        /// File path or family name the data came from.
        name: String,
        /// Face index that was requested.
        index: u32,
    },

    /// The font reports a zero units-per-em value and cannot be scaled.
    #[error("Font '{0}' has an invalid units-per-em value")]
    InvalidUnitsPerEm(String),
}
