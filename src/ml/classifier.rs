//! Classifier traits.

use crate::error::{Result, SpamCheckError};
use crate::ml::tfidf::SparseVector;
use crate::normalize::CanonicalText;

/// A trained model that estimates how likely a message is spam.
///
/// Implementations of this trait are interchangeable behind the
/// [`DecisionFuser`](crate::decision::DecisionFuser).
pub trait SpamClassifier: Send + Sync {
    /// Probability in `[0, 1]` that `text` is spam.
    ///
    /// # Arguments
    /// * `text` - The canonical form of the message
    fn predict_probability(&self, text: &CanonicalText) -> Result<f64>;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}

/// A linear model that only produces an uncalibrated margin.
pub trait MarginModel: Send + Sync {
    /// Signed distance from the decision boundary; positive means spam.
    fn decision_function(&self, x: &SparseVector) -> f64;
}

/// Reject probabilities that are NaN or outside `[0, 1]`.
pub fn validate_probability(probability: f64) -> Result<f64> {
    if probability.is_nan() || !(0.0..=1.0).contains(&probability) {
        return Err(SpamCheckError::model(format!(
            "classifier returned invalid probability {probability}"
        )));
    }
    Ok(probability)
}

/// Check that a training set is usable: non-empty, aligned, binary, and
/// containing both classes.
pub fn validate_training_set<T>(texts: &[T], labels: &[u8]) -> Result<()> {
    if texts.is_empty() {
        return Err(SpamCheckError::invalid_input("training set is empty"));
    }
    if texts.len() != labels.len() {
        return Err(SpamCheckError::invalid_input(format!(
            "{} texts but {} labels",
            texts.len(),
            labels.len()
        )));
    }
    if let Some(label) = labels.iter().find(|&&y| y > 1) {
        return Err(SpamCheckError::invalid_input(format!(
            "labels must be 0 or 1, found {label}"
        )));
    }
    let spam = labels.iter().filter(|&&y| y == 1).count();
    if spam == 0 || spam == labels.len() {
        return Err(SpamCheckError::invalid_input(
            "training set must contain both spam and ham examples",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_probability() {
        assert_eq!(validate_probability(0.0).unwrap(), 0.0);
        assert_eq!(validate_probability(1.0).unwrap(), 1.0);
        assert!(validate_probability(f64::NAN).is_err());
        assert!(validate_probability(1.0001).is_err());
        assert!(validate_probability(-0.1).is_err());
    }

    #[test]
    fn test_validate_training_set() {
        assert!(validate_training_set(&["a", "b"], &[0, 1]).is_ok());
        assert!(validate_training_set::<&str>(&[], &[]).is_err());
        assert!(validate_training_set(&["a", "b"], &[0]).is_err());
        assert!(validate_training_set(&["a", "b"], &[1, 1]).is_err());
        assert!(validate_training_set(&["a", "b"], &[0, 2]).is_err());
    }
}
