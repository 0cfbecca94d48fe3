use crate::image_classifier::interface::Classification;

/// Linear scan for the most confident classification. Comparison is strict,
/// so the earliest of equally confident entries wins.
pub fn select_best(classifications: &[Classification]) -> Option<&Classification> {
    let mut iter = classifications.iter();
    let mut best = iter.next()?;
    for classification in iter {
        if classification.confidence > best.confidence {
            best = classification;
        }
    }
    Some(best)
}

pub fn display_text(label: &str) -> String {
    format!("{}\n", label)
}
