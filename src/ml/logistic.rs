//! L2-regularized logistic regression.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::ml::classifier::MarginModel;
use crate::ml::tfidf::{SparseVector, sparse_dot};
use crate::ml::{balanced_class_weights, sigmoid};

/// Logistic regression hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    /// Inverse regularization strength.
    pub c: f64,
    /// Maximum number of gradient steps.
    pub max_iter: usize,
    /// Stop once every gradient component is below this value.
    pub tolerance: f64,
    /// Gradient descent step size.
    pub learning_rate: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        LogisticConfig {
            c: 1.0,
            max_iter: 1000,
            tolerance: 1e-4,
            learning_rate: 1.0,
        }
    }
}

/// Binary logistic regression over sparse TF-IDF features.
///
/// Trained with full-batch gradient descent on the class-weighted log loss
/// plus `||w||² / (2 * C * n)`. The bias is not regularized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
    iterations: usize,
}

impl LogisticRegression {
    /// Fit on feature vectors of dimension `dim` with 0/1 labels.
    pub fn fit(
        features: &[SparseVector],
        labels: &[u8],
        dim: usize,
        config: &LogisticConfig,
    ) -> Result<Self> {
        if config.c <= 0.0 || config.learning_rate <= 0.0 {
            return Err(SpamCheckError::config(
                "logistic regression needs positive c and learning_rate",
            ));
        }

        let n = features.len() as f64;
        let class_weights = balanced_class_weights(labels);
        let lambda = 1.0 / (config.c * n);

        let mut weights = vec![0.0; dim];
        let mut bias = 0.0;
        let mut grad = vec![0.0; dim];
        let mut iterations = 0;

        for iteration in 0..config.max_iter {
            iterations = iteration + 1;
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_bias = 0.0;

            for (x, &y) in features.iter().zip(labels) {
                let p = sigmoid(sparse_dot(x, &weights) + bias);
                let residual = class_weights[y as usize] * (p - y as f64) / n;
                for &(idx, value) in x {
                    grad[idx] += residual * value;
                }
                grad_bias += residual;
            }

            for (g, w) in grad.iter_mut().zip(&weights) {
                *g += lambda * w;
            }

            let max_grad = grad
                .iter()
                .fold(grad_bias.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < config.tolerance {
                break;
            }

            for (w, g) in weights.iter_mut().zip(&grad) {
                *w -= config.learning_rate * g;
            }
            bias -= config.learning_rate * grad_bias;
        }

        log::debug!("logistic regression stopped after {iterations} iterations");

        Ok(LogisticRegression {
            weights,
            bias,
            iterations,
        })
    }

    /// Spam probability for one vector.
    pub fn predict_probability(&self, x: &SparseVector) -> f64 {
        sigmoid(self.decision_function(x))
    }

    /// Number of gradient steps taken during training.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl MarginModel for LogisticRegression {
    fn decision_function(&self, x: &SparseVector) -> f64 {
        sparse_dot(x, &self.weights) + self.bias
    }
}
