use crate::image_classifier::interface::ImageClassifierError;
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};

/// A fixed-name PNG file bridging in-memory frames to path-based classifiers.
/// Every write overwrites the previous frame.
#[derive(Debug, Clone)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_png(&self, frame: &DynamicImage) -> Result<&Path, ImageClassifierError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ImageClassifierError::ScratchWrite(format!("{}: {}", parent.display(), e))
            })?;
        }

        frame
            .save_with_format(&self.path, ImageFormat::Png)
            .map_err(|e| {
                ImageClassifierError::ScratchWrite(format!("{}: {}", self.path.display(), e))
            })?;

        Ok(&self.path)
    }
}
