// ============================================================================
// IMAGE STORAGE — extension-driven PNG/JPEG decode & encode, file dialogs
// ============================================================================

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::RgbImage;
use rfd::FileDialog;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// File extensions the storage layer accepts (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Error type for image file operations.
#[derive(Debug)]
pub enum ImageIoError {
    Io(std::io::Error),
    Codec(image::ImageError),
    UnsupportedFormat(String),
}

impl std::fmt::Display for ImageIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageIoError::Io(e) => write!(f, "I/O error: {}", e),
            ImageIoError::Codec(e) => write!(f, "Image codec error: {}", e),
            ImageIoError::UnsupportedFormat(ext) => {
                write!(f, "Unsupported format '{}': expected png, jpg or jpeg", ext)
            }
        }
    }
}

impl From<std::io::Error> for ImageIoError {
    fn from(e: std::io::Error) -> Self {
        ImageIoError::Io(e)
    }
}

impl From<image::ImageError> for ImageIoError {
    fn from(e: image::ImageError) -> Self {
        ImageIoError::Codec(e)
    }
}

/// Lowercased extension of `path`, or "" when absent.
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Decode a PNG or JPEG file into an RGB buffer.
pub fn decode(path: &Path) -> Result<RgbImage, ImageIoError> {
    let ext = extension_of(path);
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ImageIoError::UnsupportedFormat(ext));
    }
    Ok(image::open(path)?.to_rgb8())
}

/// Encode an RGB buffer to `path`, format chosen by extension.
/// JPEG is written at maximum quality.
pub fn encode(image: &RgbImage, path: &Path) -> Result<(), ImageIoError> {
    let ext = extension_of(path);
    match ext.as_str() {
        "png" => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            let encoder = PngEncoder::new(&mut writer);
            #[allow(deprecated)]
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgb8,
            )?;
        }
        "jpg" | "jpeg" => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, 100);
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgb8,
            )?;
        }
        _ => return Err(ImageIoError::UnsupportedFormat(ext)),
    }
    Ok(())
}

// ============================================================================
// FILE HANDLER — native dialogs and the current document path
// ============================================================================

/// Tracks the current document path and shows native open/save dialogs.
/// A `None` from either dialog means the user cancelled; callers treat it as
/// a no-op.
#[derive(Default)]
pub struct FileHandler {
    /// Path of the most recently opened or saved file.
    pub current_path: Option<PathBuf>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the open dialog, starting next to the current document.
    pub fn pick_open_path(&self) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .add_filter("Images", SUPPORTED_EXTENSIONS)
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"]);
        if let Some(dir) = self.current_path.as_ref().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_file()
    }

    /// Show the save dialog, starting next to the current document.
    pub fn pick_save_path(&self) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"]);
        if let Some(dir) = self.current_path.as_ref().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }
        dialog.save_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([
                (x * 7 % 256) as u8,
                (y * 13 % 256) as u8,
                ((x + y) % 256) as u8,
            ])
        })
    }

    #[test]
    fn test_png_roundtrip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let img = gradient(17, 9);
        encode(&img, &path).unwrap();
        let back = decode(&path).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_jpeg_writes_decodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let img = gradient(16, 16);
        encode(&img, &path).unwrap();
        // Lossy codec: only dimensions are guaranteed
        let back = decode(&path).unwrap();
        assert_eq!(back.dimensions(), (16, 16));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let img = gradient(4, 4);
        let bmp = dir.path().join("out.bmp");
        assert!(matches!(
            encode(&img, &bmp),
            Err(ImageIoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            decode(Path::new("photo.webp")),
            Err(ImageIoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            decode(Path::new("no_extension")),
            Err(ImageIoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_codec_error() {
        let err = decode(Path::new("does_not_exist.png")).unwrap_err();
        assert!(matches!(err, ImageIoError::Codec(_)));
    }
}
