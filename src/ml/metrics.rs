//! Evaluation metrics for binary spam classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};

/// Probability at or above which a message is counted as spam during
/// evaluation.
pub const EVALUATION_CUTOFF: f64 = 0.5;

/// Hard labels from probabilities.
pub fn predict_labels(probabilities: &[f64]) -> Vec<u8> {
    probabilities
        .iter()
        .map(|&p| (p >= EVALUATION_CUTOFF) as u8)
        .collect()
}

/// Precision, recall and F1 of one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassMetrics {
    fn compute(y_true: &[u8], y_pred: &[u8], class: u8) -> Self {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == class, p == class) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        ClassMetrics {
            precision,
            recall,
            f1,
            support: tp + fn_,
        }
    }
}

/// Per-class metrics plus accuracy and averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub ham: ClassMetrics,
    pub spam: ClassMetrics,
    pub accuracy: f64,
}

impl ClassificationReport {
    /// Compare predicted labels with the truth.
    pub fn new(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(SpamCheckError::invalid_input(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(SpamCheckError::invalid_input("cannot evaluate zero examples"));
        }

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();

        Ok(ClassificationReport {
            ham: ClassMetrics::compute(y_true, y_pred, 0),
            spam: ClassMetrics::compute(y_true, y_pred, 1),
            accuracy: correct as f64 / y_true.len() as f64,
        })
    }

    /// Build a report from predicted probabilities.
    pub fn from_probabilities(y_true: &[u8], probabilities: &[f64]) -> Result<Self> {
        Self::new(y_true, &predict_labels(probabilities))
    }

    /// F1 of the spam class, the score models are selected by.
    pub fn f1(&self) -> f64 {
        self.spam.f1
    }

    fn total_support(&self) -> usize {
        self.ham.support + self.spam.support
    }

    /// Unweighted mean over both classes.
    pub fn macro_avg(&self) -> (f64, f64, f64) {
        (
            (self.ham.precision + self.spam.precision) / 2.0,
            (self.ham.recall + self.spam.recall) / 2.0,
            (self.ham.f1 + self.spam.f1) / 2.0,
        )
    }

    /// Support-weighted mean over both classes.
    pub fn weighted_avg(&self) -> (f64, f64, f64) {
        let total = self.total_support() as f64;
        let h = self.ham.support as f64 / total;
        let s = self.spam.support as f64 / total;
        (
            h * self.ham.precision + s * self.spam.precision,
            h * self.ham.recall + s * self.spam.recall,
            h * self.ham.f1 + s * self.spam.f1,
        )
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total_support();
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, m) in [("ham", &self.ham), ("spam", &self.spam)] {
            writeln!(
                f,
                "{:>12} {:>9.4} {:>9.4} {:>9.4} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.4} {:>9}",
            "accuracy", "", "", self.accuracy, total
        )?;
        let (p, r, f1) = self.macro_avg();
        writeln!(f, "{:>12} {:>9.4} {:>9.4} {:>9.4} {:>9}", "macro avg", p, r, f1, total)?;
        let (p, r, f1) = self.weighted_avg();
        write!(f, "{:>12} {:>9.4} {:>9.4} {:>9.4} {:>9}", "weighted avg", p, r, f1, total)
    }
}
