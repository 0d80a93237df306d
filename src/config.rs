//! Crate-wide configuration.
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes:
//!
//! ```json
//! { "thresholds": { "probability": 0.9 }, "normalizer": "extended" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::decision::Thresholds;
use crate::error::{Result, SpamCheckError};
use crate::ml::TrainingConfig;
use crate::normalize::NormalizerKind;
use crate::rules::RuleConfig;

/// Configuration for training, selection and decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamCheckConfig {
    /// Where artifacts, metrics files and the active pointer live.
    pub artifacts_dir: PathBuf,
    /// Where the training CSV files are read from.
    pub data_dir: PathBuf,
    /// Decision thresholds.
    pub thresholds: Thresholds,
    /// Canonicalization pipeline used when training.
    pub normalizer: NormalizerKind,
    /// Rule engine weights and tables.
    pub rules: RuleConfig,
    /// Training hyperparameters.
    pub training: TrainingConfig,
}

impl Default for SpamCheckConfig {
    fn default() -> Self {
        SpamCheckConfig {
            artifacts_dir: PathBuf::from("artifacts"),
            data_dir: PathBuf::from("data"),
            thresholds: Thresholds::default(),
            normalizer: NormalizerKind::default(),
            rules: RuleConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl SpamCheckConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SpamCheckConfig = serde_json::from_str(json)
            .map_err(|e| SpamCheckError::config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SpamCheckError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Reject values no component could work with.
    pub fn validate(&self) -> Result<()> {
        Thresholds::new(self.thresholds.rule, self.thresholds.probability)?;

        let training = &self.training;
        if !(training.test_size > 0.0 && training.test_size < 1.0) {
            return Err(SpamCheckError::config(format!(
                "training.test_size must be within (0, 1), got {}",
                training.test_size
            )));
        }
        if training.calibration_folds < 2 {
            return Err(SpamCheckError::config(
                "training.calibration_folds must be at least 2",
            ));
        }
        if !(0.0..=100.0).contains(&self.rules.template_cutoff) {
            return Err(SpamCheckError::config(format!(
                "rules.template_cutoff must be within 0..=100, got {}",
                self.rules.template_cutoff
            )));
        }
        Ok(())
    }
}
