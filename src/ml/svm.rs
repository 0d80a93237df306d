//! Linear support vector machine trained with Pegasos.
//!
//! The SVM only yields a margin. Wrap it in a
//! [`CalibratedClassifier`](crate::ml::CalibratedClassifier) to get
//! probabilities.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::ml::balanced_class_weights;
use crate::ml::classifier::MarginModel;
use crate::ml::tfidf::{SparseVector, sparse_dot};

/// Linear SVM hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmConfig {
    /// Inverse regularization strength.
    pub c: f64,
    /// Passes over the shuffled training set.
    pub epochs: usize,
}

impl Default for SvmConfig {
    fn default() -> Self {
        SvmConfig { c: 1.0, epochs: 20 }
    }
}

/// Hinge-loss linear classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    weights: Vec<f64>,
    bias: f64,
}

impl LinearSvm {
    /// Fit with class-weighted Pegasos SGD.
    ///
    /// The bias is learned as the weight of a constant feature. The weight
    /// vector is kept as `scale * v` so the shrink step is O(1).
    pub fn fit(
        features: &[SparseVector],
        labels: &[u8],
        dim: usize,
        config: &SvmConfig,
        seed: u64,
    ) -> Result<Self> {
        if config.c <= 0.0 || config.epochs == 0 {
            return Err(SpamCheckError::config(
                "linear SVM needs positive c and at least one epoch",
            ));
        }

        let n = features.len();
        let lambda = 1.0 / (config.c * n as f64);
        let class_weights = balanced_class_weights(labels);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..n).collect();

        // last slot holds the bias
        let mut v = vec![0.0; dim + 1];
        let mut scale = 1.0;
        let mut t = 0usize;

        for _ in 0..config.epochs {
            order.shuffle(&mut rng);

            for &i in &order {
                t += 1;
                let eta = 1.0 / (lambda * (t + 1) as f64);
                let x = &features[i];
                let y = if labels[i] == 1 { 1.0 } else { -1.0 };

                let margin = scale * (sparse_dot(x, &v) + v[dim]);

                scale *= 1.0 - eta * lambda;

                if y * margin < 1.0 {
                    let step = eta * class_weights[labels[i] as usize] * y / scale;
                    for &(idx, value) in x {
                        v[idx] += step * value;
                    }
                    v[dim] += step;
                }

                if scale < 1e-9 {
                    v.iter_mut().for_each(|w| *w *= scale);
                    scale = 1.0;
                }
            }
        }

        let bias = v[dim] * scale;
        v.truncate(dim);
        let weights = v.into_iter().map(|w| w * scale).collect();

        Ok(LinearSvm { weights, bias })
    }
}

impl MarginModel for LinearSvm {
    fn decision_function(&self, x: &SparseVector) -> f64 {
        sparse_dot(x, &self.weights) + self.bias
    }
}
