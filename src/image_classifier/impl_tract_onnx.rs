use crate::image_classifier::interface::{Classification, ImageClassifier, ImageClassifierError};
use crate::image_classifier::models::model_config::ModelConfig;
use crate::image_classifier::tract::image::{resize_image_to_tensor, Normalization};
use crate::library::logger::interface::Logger;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;

pub struct ImageClassifierTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    labels: Vec<String>,
    config: ModelConfig,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageClassifierTractOnnx {
    pub fn new(
        config: ModelConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, ImageClassifierError> {
        let logger = logger.with_namespace("image_classifier").with_namespace("tract");
        let (height, width) = config.input_shape;

        let model = tract_onnx::onnx()
            .model_for_path(&config.onnx_model_path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    f32::fact([1, 3, height as usize, width as usize]).into(),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                ImageClassifierError::ModelLoad(format!("{}: {}", config.onnx_model_path, e))
            })?;

        let labels = std::fs::read_to_string(&config.labels_path)
            .map_err(|e| ImageClassifierError::ModelLoad(format!("{}: {}", config.labels_path, e)))?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_label_line)
            .collect::<Vec<_>>();

        if labels.is_empty() {
            return Err(ImageClassifierError::ModelLoad(format!(
                "{}: no labels",
                config.labels_path
            )));
        }

        let _ = logger.info(&format!(
            "Loaded {} with {} labels",
            config.onnx_model_path,
            labels.len()
        ));

        Ok(Self {
            model,
            labels,
            config,
            logger,
        })
    }
}

impl ImageClassifier for ImageClassifierTractOnnx {
    fn classify(&self, image_path: &Path) -> Result<Vec<Classification>, ImageClassifierError> {
        let image = image::open(image_path).map_err(|e| {
            ImageClassifierError::Perform(format!("{}: {}", image_path.display(), e))
        })?;

        let (height, width) = self.config.input_shape;
        let input = resize_image_to_tensor(&image, width, height, &Normalization::IMAGENET);

        let outputs = self
            .model
            .run(tvec!(input.into_tvalue()))
            .map_err(|e| ImageClassifierError::Perform(e.to_string()))?;

        let output = outputs.first().ok_or_else(|| {
            ImageClassifierError::UnexpectedResult("model produced no outputs".to_string())
        })?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| ImageClassifierError::UnexpectedResult(e.to_string()))?;

        check_output_shape(view.shape())?;

        let scores: Vec<f32> = view.iter().copied().collect();
        let classifications = rank_scores(&scores, &self.labels, self.config.top_k)?;

        let _ = self.logger.info(&format!(
            "{} -> {:?}",
            image_path.display(),
            classifications.first().map(|c| &c.label)
        ));

        Ok(classifications)
    }
}

/// "n01440764 tench, Tinca tinca" -> "tench, Tinca tinca"
fn parse_label_line(line: &str) -> String {
    let line = line.trim();
    match line.split_once(' ') {
        Some((id, rest))
            if id.len() > 1
                && id.starts_with('n')
                && id[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            rest.trim().to_string()
        }
        _ => line.to_string(),
    }
}

fn is_distribution(scores: &[f32]) -> bool {
    let total: f32 = scores.iter().sum();
    scores.iter().all(|s| (0.0..=1.0).contains(s)) && (total - 1.0).abs() < 1e-3
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Accepts `[N]`, `[1, N]`, `[1, 1, N]` and so on: one score vector for one image.
fn check_output_shape(shape: &[usize]) -> Result<(), ImageClassifierError> {
    match shape.split_last() {
        Some((_, leading)) if leading.iter().all(|&d| d == 1) => Ok(()),
        _ => Err(ImageClassifierError::UnexpectedResult(format!(
            "expected a single score vector, got shape {:?}",
            shape
        ))),
    }
}

/// Rank raw model scores against `labels`, highest confidence first.
///
/// Models trained with a background class emit one more score than there are
/// labels; the leading background score is dropped.
fn rank_scores(
    scores: &[f32],
    labels: &[String],
    top_k: usize,
) -> Result<Vec<Classification>, ImageClassifierError> {
    let scores = if scores.len() == labels.len() {
        scores
    } else if scores.len() == labels.len() + 1 {
        &scores[1..]
    } else {
        return Err(ImageClassifierError::UnexpectedResult(format!(
            "{} scores for {} labels",
            scores.len(),
            labels.len()
        )));
    };

    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ImageClassifierError::UnexpectedResult(
            "non-finite score".to_string(),
        ));
    }

    let probabilities = if is_distribution(scores) {
        scores.to_vec()
    } else {
        softmax(scores)
    };

    let mut ranked: Vec<(usize, f32)> = probabilities.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(top_k.max(1));

    Ok(ranked
        .into_iter()
        .map(|(index, confidence)| Classification {
            label: labels[index].clone(),
            confidence,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_label_line_strips_synset_id() {
        assert_eq!(parse_label_line("n01440764 tench, Tinca tinca"), "tench, Tinca tinca");
        assert_eq!(parse_label_line("tabby cat"), "tabby cat");
        assert_eq!(parse_label_line("  dog  "), "dog");
    }

    #[test]
    fn test_rank_scores_applies_softmax_to_logits() {
        let ranked = rank_scores(&[1.0, 3.0, 2.0], &labels(&["a", "b", "c"]), 3).unwrap();

        let names: Vec<&str> = ranked.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        let total: f32 = ranked.iter().map(|c| c.confidence).sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_rank_scores_keeps_probabilities() {
        let ranked = rank_scores(&[0.1, 0.7, 0.2], &labels(&["a", "b", "c"]), 2).unwrap();

        assert_eq!(
            ranked,
            vec![
                Classification {
                    label: "b".to_string(),
                    confidence: 0.7
                },
                Classification {
                    label: "c".to_string(),
                    confidence: 0.2
                },
            ]
        );
    }

    #[test]
    fn test_rank_scores_drops_background_class() {
        let ranked = rank_scores(&[0.9, 0.02, 0.08], &labels(&["cat", "dog"]), 1).unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, "dog");
    }

    #[test]
    fn test_rank_scores_rejects_mismatched_output() {
        let result = rank_scores(&[0.5, 0.5], &labels(&["a", "b", "c", "d"]), 5);

        assert!(matches!(
            result,
            Err(ImageClassifierError::UnexpectedResult(_))
        ));
    }

    #[test]
    fn test_output_shape_accepts_single_score_vector() {
        assert!(check_output_shape(&[1000]).is_ok());
        assert!(check_output_shape(&[1, 1000]).is_ok());
        assert!(check_output_shape(&[1, 1, 1, 1001]).is_ok());
    }

    #[test]
    fn test_output_shape_rejects_batched_or_empty_output() {
        assert!(matches!(
            check_output_shape(&[2, 1000]),
            Err(ImageClassifierError::UnexpectedResult(_))
        ));
        assert!(matches!(
            check_output_shape(&[1, 3, 1000]),
            Err(ImageClassifierError::UnexpectedResult(_))
        ));
        assert!(matches!(
            check_output_shape(&[]),
            Err(ImageClassifierError::UnexpectedResult(_))
        ));
    }
}
