//! Reading font bytes from disk or from the system font database.

use std::path::Path;

use fontdb::{Database, Family, Query};

use crate::error::FontError;

pub(super) fn read_font_file(path: &Path) -> Result<Vec<u8>, FontError> {
    std::fs::read(path).map_err(|source| FontError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Find `family` among the installed fonts and copy its face data.
///
/// Returns the bytes and the face index inside them.
pub(super) fn load_font_from_system(family: &str) -> Result<(Vec<u8>, u32), FontError> {
    let mut font_db = Database::new();
    font_db.load_system_fonts();
    log::debug!("Loaded {} system font faces", font_db.len());

    let families = [Family::Name(family)];
    let query = Query {
        families: &families,
        ..Query::default()
    };

    let id = font_db
        .query(&query)
        .ok_or_else(|| FontError::NotFound(family.to_string()))?;

    font_db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| FontError::NotFound(family.to_string()))
}
