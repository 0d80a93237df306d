//! OR-fusion of the rule score and the classifier probability.
//!
//! A message is spam as soon as either signal reaches its own threshold.
//! Neither signal can veto the other, which favours catching spam over
//! avoiding false positives.
//!
//! # Examples
//!
//! ```
//! use spamcheck::decision::{Thresholds, fuse};
//!
//! let thresholds = Thresholds::default();
//!
//! assert!(!fuse(1, 0.79, &thresholds).is_spam());
//! assert!(fuse(2, 0.0, &thresholds).is_spam());
//! assert!(fuse(0, 0.80, &thresholds).is_spam());
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::ml::classifier::{SpamClassifier, validate_probability};
use crate::normalize::{CanonicalText, Normalizer, decode_utf8};
use crate::rules::RuleEngine;
use crate::storage::Artifact;

/// Per-signal thresholds. Each is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum rule score that flags spam on its own.
    pub rule: u32,
    /// Minimum classifier probability that flags spam on its own.
    pub probability: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            rule: 2,
            probability: 0.80,
        }
    }
}

impl Thresholds {
    pub fn new(rule: u32, probability: f64) -> Result<Self> {
        if probability.is_nan() || !(0.0..=1.0).contains(&probability) {
            return Err(SpamCheckError::config(format!(
                "probability threshold must be within [0, 1], got {probability}"
            )));
        }
        Ok(Thresholds { rule, probability })
    }
}

/// Outcome of one decision together with the signals it was based on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    spam: bool,
    rule_score: u32,
    probability: f64,
}

impl Verdict {
    pub fn is_spam(&self) -> bool {
        self.spam
    }

    pub fn rule_score(&self) -> u32 {
        self.rule_score
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

/// Combine the two signals with OR semantics.
pub fn fuse(rule_score: u32, probability: f64, thresholds: &Thresholds) -> Verdict {
    let spam = rule_score >= thresholds.rule || probability >= thresholds.probability;
    Verdict {
        spam,
        rule_score,
        probability,
    }
}

/// Runs the full decision path for raw messages.
///
/// The rule engine scores the basic canonical form, which its tables are
/// written for. The classifier sees that form after the rest of the
/// normalizer's pipeline, the same text it was trained on.
pub struct DecisionFuser {
    normalizer: Normalizer,
    rules: Arc<RuleEngine>,
    classifier: Arc<dyn SpamClassifier>,
    thresholds: Thresholds,
}

impl std::fmt::Debug for DecisionFuser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionFuser")
            .field("normalizer", &self.normalizer.kind())
            .field("classifier", &self.classifier.name())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl DecisionFuser {
    pub fn new(
        normalizer: Normalizer,
        rules: Arc<RuleEngine>,
        classifier: Arc<dyn SpamClassifier>,
        thresholds: Thresholds,
    ) -> Self {
        DecisionFuser {
            normalizer,
            rules,
            classifier,
            thresholds,
        }
    }

    /// Build a fuser around a stored artifact, normalizing with the pipeline
    /// the artifact was trained with.
    pub fn from_artifact(
        artifact: Artifact,
        rules: Arc<RuleEngine>,
        thresholds: Thresholds,
    ) -> Result<Self> {
        let normalizer = Normalizer::new(artifact.meta.normalizer)?;
        Ok(Self::new(
            normalizer,
            rules,
            Arc::new(artifact.classifier),
            thresholds,
        ))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Decide on a message already in basic canonical form.
    pub fn decide_canonical(&self, canonical: &CanonicalText) -> Result<Verdict> {
        let rule_score = self.rules.score(canonical);
        let model_text = self.normalizer.refine(canonical)?;
        let probability = validate_probability(self.classifier.predict_probability(&model_text)?)?;

        let verdict = fuse(rule_score, probability, &self.thresholds);
        log::debug!(
            "verdict spam={} (rule score {rule_score}, probability {probability:.4}, classifier {})",
            verdict.is_spam(),
            self.classifier.name()
        );
        Ok(verdict)
    }

    /// Decide on a raw message.
    pub fn decide(&self, raw: &str) -> Result<Verdict> {
        let canonical = self.normalizer.normalize_basic(raw)?;
        self.decide_canonical(&canonical)
    }

    /// Decide on raw bytes, rejecting anything that is not UTF-8.
    pub fn decide_bytes(&self, raw: &[u8]) -> Result<Verdict> {
        self.decide(decode_utf8(raw)?)
    }
}
