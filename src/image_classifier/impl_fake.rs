use crate::image_classifier::interface::{Classification, ImageClassifier, ImageClassifierError};
use crate::library::logger::interface::Logger;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const LABELS: [&str; 18] = [
    "dog", "cat", "person", "car", "chair", "table", "bird", "tree", "bicycle", "book", "laptop",
    "phone", "cup", "bottle", "keyboard", "mouse", "plant", "clock",
];

pub struct ImageClassifierFake {
    logger: Arc<dyn Logger + Send + Sync>,
    fixed: Option<Vec<Classification>>,
    classified_paths: Mutex<Vec<PathBuf>>,
}

impl ImageClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("image_classifier").with_namespace("fake"),
            fixed: None,
            classified_paths: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `classifications`, in the given order.
    #[allow(dead_code)]
    pub fn returning(
        logger: Arc<dyn Logger + Send + Sync>,
        classifications: Vec<Classification>,
    ) -> Self {
        Self {
            fixed: Some(classifications),
            ..Self::new(logger)
        }
    }

    #[allow(dead_code)]
    pub fn classified_paths(&self) -> Vec<PathBuf> {
        self.classified_paths
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }

    fn random_classifications() -> Vec<Classification> {
        let mut rng = rand::rng();
        let picks = rand::seq::index::sample(&mut rng, LABELS.len(), 3);
        let weights: Vec<f32> = picks
            .iter()
            .map(|_| rng.random_range(0.05..1.0))
            .collect();
        let total: f32 = weights.iter().sum();

        let mut classifications: Vec<Classification> = picks
            .iter()
            .zip(weights)
            .map(|(index, weight)| Classification {
                label: LABELS[index].to_string(),
                confidence: weight / total,
            })
            .collect();
        classifications.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        classifications
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn classify(&self, image_path: &Path) -> Result<Vec<Classification>, ImageClassifierError> {
        let _ = self
            .logger
            .info(&format!("Classifying {}", image_path.display()));

        if let Ok(mut paths) = self.classified_paths.lock() {
            paths.push(image_path.to_path_buf());
        }

        let classifications = match &self.fixed {
            Some(fixed) => fixed.clone(),
            None => Self::random_classifications(),
        };

        Ok(classifications)
    }
}
