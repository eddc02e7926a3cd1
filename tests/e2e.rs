// End-to-end session: decode from disk, stack filters, undo/redo, encode back.

use std::path::Path;

use image::{Rgb, RgbImage};

use filterfe::editor::{Editor, EditorError};
use filterfe::filters::Filter;

fn sample_image() -> RgbImage {
    RgbImage::from_fn(8, 6, |x, y| {
        Rgb([(x * 30) as u8, (y * 40) as u8, ((x + y) * 10) as u8])
    })
}

#[test]
fn full_session_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photo.png");
    sample_image().save(&input).unwrap();

    let mut editor = Editor::new();
    editor.load(&input).unwrap();

    editor.apply_filter(Filter::Sepia);
    editor.apply_filter(Filter::MaxContrast);
    let stacked = editor.current().unwrap().clone();

    // Undo both steps: back to the decoded original
    editor.undo().unwrap();
    let restored = editor.undo().unwrap().clone();
    assert_eq!(restored, sample_image());

    // Redo both steps restores the stacked result exactly
    editor.redo().unwrap();
    let redone = editor.redo().unwrap().clone();
    assert_eq!(redone, stacked);

    // Save and re-decode: PNG roundtrip preserves the filtered pixels
    let output = dir.path().join("filtered.png");
    editor.save(&output).unwrap();
    let reloaded = image::open(&output).unwrap().to_rgb8();
    assert_eq!(reloaded, stacked);
}

#[test]
fn custom_matrix_filter_in_session() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photo.png");
    sample_image().save(&input).unwrap();

    let mut editor = Editor::new();
    editor.load(&input).unwrap();

    let cells: Vec<Vec<String>> = vec![
        vec!["0.5".into(), "0".into(), "0".into(), "16".into()],
        vec!["0".into(), "0.5".into(), "0".into(), "16".into()],
        vec!["0".into(), "0".into(), "0.5".into(), "16".into()],
    ];
    let filter = editor.create_matrix_filter(&cells).unwrap();
    editor.apply_filter(filter);

    // Pixel (2,1) is (60, 40, 30); 0.5*c + 16 per channel
    let px = editor.current().unwrap().get_pixel(2, 1).0;
    assert_eq!(px, [46, 36, 31]);

    editor.undo().unwrap();
    assert_eq!(editor.current().unwrap(), &sample_image());
}

#[test]
fn operations_before_load_fail() {
    let mut editor = Editor::new();
    assert!(matches!(
        editor.save(Path::new("nowhere.png")),
        Err(EditorError::NoImageLoaded)
    ));
    assert!(matches!(editor.undo(), Err(EditorError::NoImageLoaded)));
    assert!(matches!(editor.redo(), Err(EditorError::NoImageLoaded)));
}
