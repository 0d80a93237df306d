//! Statistical spam classifiers.
//!
//! Every family works on [`CanonicalText`](crate::normalize::CanonicalText)
//! through a shared TF-IDF vectorizer and exposes a spam probability through
//! the [`SpamClassifier`] trait. Families that only produce a margin are
//! wrapped in a [`CalibratedClassifier`].

pub mod calibration;
pub mod centroid;
pub mod classifier;
pub mod logistic;
pub mod metrics;
pub mod model;
pub mod svm;
pub mod tfidf;

pub use calibration::{CalibratedClassifier, PlattSigmoid};
pub use centroid::CentroidClassifier;
pub use classifier::{MarginModel, SpamClassifier};
pub use logistic::{LogisticConfig, LogisticRegression};
pub use metrics::{ClassMetrics, ClassificationReport};
pub use model::{ModelFamily, TextClassifier, TrainedModel};
pub use svm::{LinearSvm, SvmConfig};
pub use tfidf::{SparseVector, TfIdfConfig, TfIdfVectorizer};

use serde::{Deserialize, Serialize};

/// Hyperparameters for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Seed for every random choice (sampling, splits, SGD order, folds).
    pub seed: u64,
    /// Fraction of each variant held out for evaluation.
    pub test_size: f64,
    /// Feature extraction.
    pub tfidf: TfIdfConfig,
    /// Logistic regression.
    pub logistic: LogisticConfig,
    /// Linear SVM.
    pub svm: SvmConfig,
    /// Number of stratified folds used to calibrate the SVM.
    pub calibration_folds: usize,
    /// Steepness of the centroid classifier's probability curve.
    pub centroid_sharpness: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            seed: 42,
            test_size: 0.25,
            tfidf: TfIdfConfig::default(),
            logistic: LogisticConfig::default(),
            svm: SvmConfig::default(),
            calibration_folds: 5,
            centroid_sharpness: 10.0,
        }
    }
}

/// Logistic function, stable for large magnitudes.
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Per-class weights `n / (2 * n_class)`, as `[ham, spam]`.
pub(crate) fn balanced_class_weights(labels: &[u8]) -> [f64; 2] {
    let n = labels.len() as f64;
    let spam = labels.iter().filter(|&&y| y == 1).count() as f64;
    let ham = n - spam;
    [n / (2.0 * ham.max(1.0)), n / (2.0 * spam.max(1.0))]
}
