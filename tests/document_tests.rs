//! PDF output end to end.

mod common;

use std::path::PathBuf;

use common::{TEST_FONT_PATH, contains, test_font};
use emojivur::app::App;
use emojivur::cli::{OutputTarget, RunOptions};
use emojivur::error::EmojivurError;
use emojivur::layout::{OutputMode, RenderSpec, Viewport, layout};
use emojivur::resources::{ResourceKind, ResourceOwner};
use emojivur::sink::DocumentSink;
use emojivur_fonts::{FontError, FontSource, TextShaper};

fn document_options(font: FontSource, output: PathBuf) -> RunOptions {
    RunOptions {
        font,
        face_index: 0,
        text: "AB".to_string(),
        pxsize: 64,
        target: OutputTarget::Document(output),
        print_scale: 2,
        min_window: Viewport::new(320, 240),
        background_color: [255, 255, 255],
        paint_color: [0, 0, 0, 255],
    }
}

#[test]
fn test_sink_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ab.pdf");

    let font = test_font();
    let run = TextShaper::new().shape(&font, "AB", 64).unwrap();
    let spec = RenderSpec::new(&font, layout(&run.glyphs, 64, OutputMode::Print), 64);

    let owner = ResourceOwner::new();
    DocumentSink::new(&path, 2, [0, 0, 0, 255])
        .render(&owner, &spec)
        .unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(contains(&bytes, b"/MediaBox"));
    assert!(contains(&bytes, b"/Creator"));
    assert!(contains(&bytes[bytes.len().saturating_sub(16)..], b"%%EOF"));

    assert_eq!(
        owner.released(),
        vec![ResourceKind::Page, ResourceKind::Canvas]
    );
}

#[test]
fn test_sink_reports_page_create_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("out.pdf");

    let font = test_font();
    let spec = RenderSpec::new(&font, layout(&[], 20, OutputMode::Print), 20);
    let owner = ResourceOwner::new();
    let result = DocumentSink::new(&path, 1, [0, 0, 0, 255]).render(&owner, &spec);

    assert!(matches!(result, Err(EmojivurError::PageCreate { .. })));
    assert_eq!(owner.released(), vec![ResourceKind::Canvas]);
    assert!(owner.held().is_empty());
}

#[test]
fn test_huge_page_fails_cleanly_without_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.pdf");

    let font = test_font();
    let run = TextShaper::new().shape(&font, "AB", 10_000).unwrap();
    let spec = RenderSpec::new(&font, layout(&run.glyphs, run.pxsize, OutputMode::Print), run.pxsize);
    let owner = ResourceOwner::new();
    let result = DocumentSink::new(&path, 4, [0, 0, 0, 255]).render(&owner, &spec);

    assert!(matches!(result, Err(EmojivurError::Canvas(_))));
    assert!(!path.exists());
    assert!(owner.events().is_empty());
}

#[test]
fn test_app_document_run_releases_everything_in_reverse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.pdf");
    let owner = ResourceOwner::new();
    let options = document_options(FontSource::resolve(TEST_FONT_PATH), path.clone());

    App::with_owner(options, owner.clone()).run().unwrap();

    assert!(path.exists());
    assert_eq!(
        owner.released(),
        vec![
            ResourceKind::Page,
            ResourceKind::Canvas,
            ResourceKind::GlyphArray,
            ResourceKind::ShapingBuffer,
            ResourceKind::Font,
        ]
    );
    assert!(owner.held().is_empty());
}

#[test]
fn test_app_font_failure_acquires_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.pdf");
    let owner = ResourceOwner::new();
    let options = document_options(
        FontSource::Path(dir.path().join("no-such-font.ttf")),
        path.clone(),
    );

    let result = App::with_owner(options, owner.clone()).run();

    assert!(matches!(
        result,
        Err(EmojivurError::Font(FontError::Read { .. }))
    ));
    assert_eq!(result.unwrap_err().exit_code(), 1);
    assert!(owner.events().is_empty());
    assert!(!path.exists());
}
