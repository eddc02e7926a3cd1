// ============================================================================
// EDITOR — owns the loaded image and derives the current one by replay
// ============================================================================

use std::path::Path;

use image::RgbImage;

use crate::filters::{ColorMatrix, Filter, MatrixError};
use crate::history::{Command, History};
use crate::io::{self, ImageIoError};

/// Error type for editor operations.
#[derive(Debug)]
pub enum EditorError {
    /// Save/undo/redo attempted before any image was loaded.
    NoImageLoaded,
    /// Decode/encode failure from the storage layer.
    Storage(ImageIoError),
}

impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorError::NoImageLoaded => write!(f, "No image loaded"),
            EditorError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl From<ImageIoError> for EditorError {
    fn from(e: ImageIoError) -> Self {
        EditorError::Storage(e)
    }
}

/// Document state: the as-loaded image, the image after replaying history,
/// and the history itself.
///
/// Invariant: `current` always equals `history.execute(original)`. Undo and
/// redo never patch `current` incrementally; they rebuild it from `original`,
/// which keeps any number of stacked filters exactly reversible.
#[derive(Default)]
pub struct Editor {
    original: Option<RgbImage>,
    current: Option<RgbImage>,
    history: History,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The image after all applied filters, if one is loaded.
    pub fn current(&self) -> Option<&RgbImage> {
        self.current.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Decode an image file and make it the working document. History is
    /// deliberately left alone: clearing it is an explicit user action, and
    /// a surviving command list replays onto the new image on undo/redo.
    pub fn load(&mut self, path: &Path) -> Result<&RgbImage, EditorError> {
        let decoded = io::decode(path)?;
        self.original = Some(decoded.clone());
        self.current = Some(decoded);
        Ok(self.current.as_ref().unwrap())
    }

    /// Encode the current image to `path`; the format follows the extension.
    pub fn save(&self, path: &Path) -> Result<(), EditorError> {
        let image = self.current.as_ref().ok_or(EditorError::NoImageLoaded)?;
        io::encode(image, path)?;
        Ok(())
    }

    /// Apply a filter to the current image, recording it in history.
    /// Returns `None` when no image is loaded (nothing to do, nothing recorded).
    pub fn apply_filter(&mut self, filter: Filter) -> Option<&RgbImage> {
        let command = Command::ApplyFilter(filter);
        let updated = {
            let image = self.current.as_ref()?;
            command.execute(image)
        };
        self.history.add(command);
        self.current = Some(updated);
        self.current.as_ref()
    }

    /// Step history back one command and rebuild the image by replay.
    pub fn undo(&mut self) -> Result<&RgbImage, EditorError> {
        self.history.undo();
        self.replay()
    }

    /// Step history forward one command and rebuild the image by replay.
    pub fn redo(&mut self) -> Result<&RgbImage, EditorError> {
        self.history.redo();
        self.replay()
    }

    /// Forget all recorded commands. The image buffers are untouched; the
    /// caller decides whether the canvas should visually reset.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Build a custom filter from the matrix dialog's raw cells. Touches no
    /// editor state, so a rejected matrix can never corrupt history.
    pub fn create_matrix_filter(&self, cells: &[Vec<String>]) -> Result<Filter, MatrixError> {
        ColorMatrix::parse(cells).map(Filter::Custom)
    }

    fn replay(&mut self) -> Result<&RgbImage, EditorError> {
        let original = self.original.as_ref().ok_or(EditorError::NoImageLoaded)?;
        self.current = Some(self.history.execute(original));
        Ok(self.current.as_ref().unwrap())
    }
}
