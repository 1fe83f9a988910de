//! Font loading with a shaping view and a rendering view over the same bytes.

mod loader;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use swash::{CacheKey, FontRef};

use crate::error::FontError;

/// Where the font named on the command line comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A font file on disk.
    Path(PathBuf),
    /// A family name looked up in the system font database.
    Family(String),
}

impl FontSource {
    /// Treat the argument as a path when such a file exists, otherwise as a
    /// family name.
    pub fn resolve(arg: &str) -> Self {
        let path = Path::new(arg);
        if path.is_file() {
            FontSource::Path(path.to_path_buf())
        } else {
            FontSource::Family(arg.to_string())
        }
    }
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::Path(path) => write!(f, "{}", path.display()),
            FontSource::Family(name) => write!(f, "family '{}'", name),
        }
    }
}

/// A font face loaded once and shared by the shaper and the renderer.
///
/// The shaping view (`shaping_face`) and the rendering view (`render_ref`)
/// borrow the bytes owned here, so neither can outlive the `LoadedFont`.
pub struct LoadedFont {
    name: String,
    data: Arc<Vec<u8>>,
    face_index: u32,
    units_per_em: u16,
    // Table directory location found by swash at load time
    render_offset: u32,
    render_key: CacheKey,
}

impl fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedFont")
            .field("name", &self.name)
            .field("data_len", &self.data.len())
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl LoadedFont {
    /// Load a font from a path or a system family name.
    ///
    /// `face_index` selects a face inside a collection file. Family lookups
    /// use the index reported by the font database instead.
    pub fn load(source: &FontSource, face_index: u32) -> Result<Self, FontError> {
        match source {
            FontSource::Path(path) => {
                log::info!("Loading font file {:?} (face {})", path, face_index);
                let data = loader::read_font_file(path)?;
                Self::from_bytes(data, face_index, path.display().to_string())
            }
            FontSource::Family(family) => {
                log::info!("Looking up font family '{}'", family);
                let (data, index) = loader::load_font_from_system(family)?;
                Self::from_bytes(data, index, family.clone())
            }
        }
    }

    /// Build a font from bytes already in memory.
    ///
    /// Both views are validated here so later accessors cannot fail on parse.
    pub fn from_bytes(data: Vec<u8>, face_index: u32, name: String) -> Result<Self, FontError> {
        let parse_error = || FontError::Parse {
            name: name.clone(),
            index: face_index,
        };

        let units_per_em = {
            let face = rustybuzz::Face::from_slice(&data, face_index).ok_or_else(parse_error)?;
            face.units_per_em() as u16
        };
        if units_per_em == 0 {
            return Err(FontError::InvalidUnitsPerEm(name.clone()));
        }

        let (render_offset, render_key) = {
            let font_ref =
                FontRef::from_index(&data, face_index as usize).ok_or_else(parse_error)?;
            (font_ref.offset, font_ref.key)
        };

        log::debug!(
            "Loaded font '{}': {} bytes, face {}, {} units per em",
            name,
            data.len(),
            face_index,
            units_per_em
        );

        Ok(LoadedFont {
            name,
            data: Arc::new(data),
            face_index,
            units_per_em,
            render_offset,
            render_key,
        })
    }

    /// File path or family name the font was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Shaping view over the font bytes.
    pub fn shaping_face(&self) -> Result<rustybuzz::Face<'_>, FontError> {
        rustybuzz::Face::from_slice(self.data(), self.face_index).ok_or_else(|| FontError::Parse {
            name: self.name.clone(),
            index: self.face_index,
        })
    }

    /// Rendering view over the font bytes.
    pub fn render_ref(&self) -> FontRef<'_> {
        FontRef {
            data: self.data(),
            offset: self.render_offset,
            key: self.render_key,
        }
    }
}
