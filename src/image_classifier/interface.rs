use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

#[derive(Debug, Error)]
pub enum ImageClassifierError {
    #[error("could not load model: {0}")]
    ModelLoad(String),
    #[error("could not write scratch file: {0}")]
    ScratchWrite(String),
    #[error("could not perform classification request: {0}")]
    Perform(String),
    #[error("could not get any prediction output from model: {0}")]
    UnexpectedResult(String),
}

/// Blocking classifier over an image file. Results are ranked by descending
/// confidence.
pub trait ImageClassifier: Send + Sync {
    fn classify(&self, image_path: &Path) -> Result<Vec<Classification>, ImageClassifierError>;
}
