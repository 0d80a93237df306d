//! Nearest-prototype classifier using cosine similarity to class centroids.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::ml::sigmoid;
use crate::ml::tfidf::{SparseVector, sparse_dot};

/// Mean TF-IDF vector of one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Centroid {
    pub vector: Vec<f64>,
    pub norm: f64,
    pub support: usize,
}

impl Centroid {
    fn from_members<'a>(members: impl Iterator<Item = &'a SparseVector>, dim: usize) -> Self {
        let mut vector = vec![0.0; dim];
        let mut support = 0;
        for x in members {
            for &(idx, value) in x {
                vector[idx] += value;
            }
            support += 1;
        }
        if support > 0 {
            vector.iter_mut().for_each(|v| *v /= support as f64);
        }
        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        Centroid {
            vector,
            norm,
            support,
        }
    }

    /// Cosine similarity to a sparse vector.
    fn cosine_similarity(&self, x: &SparseVector) -> f64 {
        let x_norm = x.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if self.norm == 0.0 || x_norm == 0.0 {
            0.0
        } else {
            sparse_dot(x, &self.vector) / (self.norm * x_norm)
        }
    }
}

/// Classifies by comparing a message to the spam and ham centroids.
///
/// The probability is `sigmoid(sharpness * (sim_spam - sim_ham))`, so a
/// message equally close to both classes (or sharing no terms with either)
/// gets 0.5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidClassifier {
    ham: Centroid,
    spam: Centroid,
    sharpness: f64,
}

impl CentroidClassifier {
    /// Build the class centroids.
    pub fn fit(
        features: &[SparseVector],
        labels: &[u8],
        dim: usize,
        sharpness: f64,
    ) -> Result<Self> {
        if sharpness.is_nan() || sharpness <= 0.0 {
            return Err(SpamCheckError::config(format!(
                "centroid sharpness must be positive, got {sharpness}"
            )));
        }

        let members = |class: u8| {
            features
                .iter()
                .zip(labels)
                .filter(move |&(_, &y)| y == class)
                .map(|(x, _)| x)
        };

        Ok(CentroidClassifier {
            ham: Centroid::from_members(members(0), dim),
            spam: Centroid::from_members(members(1), dim),
            sharpness,
        })
    }

    /// Similarity to the spam centroid minus similarity to the ham centroid.
    pub fn similarity_gap(&self, x: &SparseVector) -> f64 {
        self.spam.cosine_similarity(x) - self.ham.cosine_similarity(x)
    }

    /// Spam probability for one vector.
    pub fn predict_probability(&self, x: &SparseVector) -> f64 {
        sigmoid(self.sharpness * self.similarity_gap(x))
    }

    /// The `(ham, spam)` centroids.
    pub fn centroids(&self) -> (&Centroid, &Centroid) {
        (&self.ham, &self.spam)
    }

    /// Steepness of the probability curve.
    pub fn sharpness(&self) -> f64 {
        self.sharpness
    }
}
