//! Sigmoid (Platt) calibration of margin classifiers.
//!
//! [`CalibratedClassifier::fit`] splits the training set into stratified
//! folds. For each fold a model is trained on the remaining folds and a
//! sigmoid is fitted to its margins on the held-out fold. The calibrated
//! probability is the mean over all fold models.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::ml::classifier::MarginModel;
use crate::ml::tfidf::SparseVector;

const NEWTON_MAX_ITER: usize = 100;
const NEWTON_MIN_STEP: f64 = 1e-10;
const NEWTON_SIGMA: f64 = 1e-12;
const NEWTON_EPS: f64 = 1e-5;

/// `p = 1 / (1 + exp(a * f + b))` for a margin `f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattSigmoid {
    pub a: f64,
    pub b: f64,
}

impl PlattSigmoid {
    /// Fit on margins and 0/1 labels with Newton's method and backtracking,
    /// using smoothed targets to avoid overfitting small folds.
    pub fn fit(margins: &[f64], labels: &[u8]) -> Self {
        let prior1 = labels.iter().filter(|&&y| y == 1).count() as f64;
        let prior0 = labels.len() as f64 - prior1;

        let hi = (prior1 + 1.0) / (prior1 + 2.0);
        let lo = 1.0 / (prior0 + 2.0);
        let targets: Vec<f64> = labels
            .iter()
            .map(|&y| if y == 1 { hi } else { lo })
            .collect();

        let mut a = 0.0;
        let mut b = ((prior0 + 1.0) / (prior1 + 1.0)).ln();
        let mut fval = Self::objective(margins, &targets, a, b);

        for _ in 0..NEWTON_MAX_ITER {
            let (mut h11, mut h22, mut h21) = (NEWTON_SIGMA, NEWTON_SIGMA, 0.0);
            let (mut g1, mut g2) = (0.0, 0.0);

            for (&f, &t) in margins.iter().zip(&targets) {
                let fapb = f * a + b;
                let (p, q) = if fapb >= 0.0 {
                    let e = (-fapb).exp();
                    (e / (1.0 + e), 1.0 / (1.0 + e))
                } else {
                    let e = fapb.exp();
                    (1.0 / (1.0 + e), e / (1.0 + e))
                };
                let d2 = p * q;
                h11 += f * f * d2;
                h22 += d2;
                h21 += f * d2;
                let d1 = t - p;
                g1 += f * d1;
                g2 += d1;
            }

            if g1.abs() < NEWTON_EPS && g2.abs() < NEWTON_EPS {
                break;
            }

            let det = h11 * h22 - h21 * h21;
            let da = -(h22 * g1 - h21 * g2) / det;
            let db = -(-h21 * g1 + h11 * g2) / det;
            let gd = g1 * da + g2 * db;

            let mut step = 1.0;
            while step >= NEWTON_MIN_STEP {
                let new_a = a + step * da;
                let new_b = b + step * db;
                let new_f = Self::objective(margins, &targets, new_a, new_b);
                if new_f < fval + 1e-4 * step * gd {
                    a = new_a;
                    b = new_b;
                    fval = new_f;
                    break;
                }
                step /= 2.0;
            }

            if step < NEWTON_MIN_STEP {
                log::debug!("platt line search failed, keeping current sigmoid");
                break;
            }
        }

        PlattSigmoid { a, b }
    }

    fn objective(margins: &[f64], targets: &[f64], a: f64, b: f64) -> f64 {
        margins
            .iter()
            .zip(targets)
            .map(|(&f, &t)| {
                let fapb = f * a + b;
                if fapb >= 0.0 {
                    t * fapb + (-fapb).exp().ln_1p()
                } else {
                    (t - 1.0) * fapb + fapb.exp().ln_1p()
                }
            })
            .sum()
    }

    /// Probability for one margin.
    pub fn probability(&self, margin: f64) -> f64 {
        let fapb = margin * self.a + self.b;
        if fapb >= 0.0 {
            let e = (-fapb).exp();
            e / (1.0 + e)
        } else {
            1.0 / (1.0 + fapb.exp())
        }
    }
}

/// A margin model paired with the sigmoid fitted on its held-out fold.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalibratedFold<M> {
    model: M,
    sigmoid: PlattSigmoid,
}

/// Probability-emitting decorator around a [`MarginModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibratedClassifier<M> {
    folds: Vec<CalibratedFold<M>>,
}

impl<M: MarginModel> CalibratedClassifier<M> {
    /// Calibrate with `k` stratified folds. Fold models are fitted in
    /// parallel by `fit_model`, which receives the training features and
    /// labels of one fold.
    pub fn fit<F>(
        features: &[SparseVector],
        labels: &[u8],
        k: usize,
        seed: u64,
        fit_model: F,
    ) -> Result<Self>
    where
        F: Fn(&[SparseVector], &[u8]) -> Result<M> + Sync,
    {
        let assignment = stratified_folds(labels, k, seed)?;
        let k = assignment.iter().max().map_or(0, |&fold| fold + 1);

        let folds = (0..k)
            .into_par_iter()
            .map(|fold| {
                let mut train_x = Vec::new();
                let mut train_y = Vec::new();
                let mut held_out = Vec::new();
                for (i, &assigned) in assignment.iter().enumerate() {
                    if assigned == fold {
                        held_out.push(i);
                    } else {
                        train_x.push(features[i].clone());
                        train_y.push(labels[i]);
                    }
                }

                let model = fit_model(&train_x, &train_y)?;
                let margins: Vec<f64> = held_out
                    .iter()
                    .map(|&i| model.decision_function(&features[i]))
                    .collect();
                let held_labels: Vec<u8> = held_out.iter().map(|&i| labels[i]).collect();
                let sigmoid = PlattSigmoid::fit(&margins, &held_labels);

                Ok(CalibratedFold { model, sigmoid })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!("calibrated {} fold models", folds.len());

        Ok(CalibratedClassifier { folds })
    }

    /// Mean calibrated probability over the fold models.
    pub fn predict_probability(&self, x: &SparseVector) -> f64 {
        let total: f64 = self
            .folds
            .iter()
            .map(|fold| fold.sigmoid.probability(fold.model.decision_function(x)))
            .sum();
        total / self.folds.len() as f64
    }

    /// Number of fold models.
    pub fn fold_count(&self) -> usize {
        self.folds.len()
    }
}

/// Assign every example to one of `k` folds so that each fold holds a
/// share of both classes. `k` is lowered to the size of the smaller class.
fn stratified_folds(labels: &[u8], k: usize, seed: u64) -> Result<Vec<usize>> {
    if k < 2 {
        return Err(SpamCheckError::config(format!(
            "calibration needs at least 2 folds, got {k}"
        )));
    }

    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, &y) in labels.iter().enumerate() {
        by_class[(y == 1) as usize].push(i);
    }

    let smallest = by_class[0].len().min(by_class[1].len());
    if smallest < 2 {
        return Err(SpamCheckError::invalid_input(format!(
            "calibration needs at least 2 examples of each class, smallest class has {smallest}"
        )));
    }
    let k = k.min(smallest);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut assignment = vec![0; labels.len()];
    for members in &mut by_class {
        members.shuffle(&mut rng);
        for (position, &i) in members.iter().enumerate() {
            assignment[i] = position % k;
        }
    }

    Ok(assignment)
}
