use crate::image_classifier::interface::{Classification, ImageClassifier, ImageClassifierError};
use crate::library::logger::interface::Logger;
use crate::scratch_file::ScratchFile;
use image::DynamicImage;
use std::sync::Arc;

/// Bridges captured frames to the path-based classifier through the scratch
/// file. Blocks until the classifier answers.
#[derive(Clone)]
pub struct ClassificationAdapter {
    scratch_file: ScratchFile,
    image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ClassificationAdapter {
    pub fn new(
        scratch_file: ScratchFile,
        image_classifier: Arc<dyn ImageClassifier + Send + Sync>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            scratch_file,
            image_classifier,
            logger: logger.with_namespace("classification_adapter"),
        }
    }

    pub fn classify(
        &self,
        frame: &DynamicImage,
    ) -> Result<Vec<Classification>, ImageClassifierError> {
        let path = self.scratch_file.write_png(frame)?;
        let _ = self.logger.info(&format!(
            "Wrote {}x{} frame to {}",
            frame.width(),
            frame.height(),
            path.display()
        ));

        let classifications = self.image_classifier.classify(path)?;
        let _ = self
            .logger
            .info(&format!("Received {} classifications", classifications.len()));

        Ok(classifications)
    }
}
