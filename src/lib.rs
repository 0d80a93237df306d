//! # spamcheck
//!
//! Comment spam detection that fuses two independent signals.
//!
//! ## Features
//!
//! - Deterministic canonicalization (case, URLs, digit runs)
//! - Keyword and fuzzy-template rule scoring
//! - Trainable text classifiers with probability outputs
//! - OR-fusion of the rule score and the classifier probability
//! - Metric-driven model selection with an atomically swapped active model
//!
//! ## Example
//!
//! ```
//! use spamcheck::normalize::Normalizer;
//! use spamcheck::rules::{RuleConfig, RuleEngine};
//!
//! let normalizer = Normalizer::basic().unwrap();
//! let rules = RuleEngine::new(&RuleConfig::default()).unwrap();
//!
//! let canonical = normalizer.normalize("Click here!").unwrap();
//! assert_eq!(rules.score(&canonical), 3);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod decision;
pub mod error;
pub mod ml;
pub mod normalize;
pub mod rules;
pub mod selection;
pub mod storage;
pub mod util;

pub mod prelude {
    pub use crate::decision::{DecisionFuser, Thresholds, Verdict};
    pub use crate::error::{Result, SpamCheckError};
    pub use crate::ml::SpamClassifier;
    pub use crate::normalize::{CanonicalText, Normalizer, NormalizerKind};
    pub use crate::rules::RuleEngine;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
