//! Evaluation records and their `{variant}_metrics.json` files.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::storage::FileStore;

/// Suffix of every metrics file; the part before it is the variant.
pub const METRICS_SUFFIX: &str = "_metrics.json";

/// Quality of one trained model on one data-split variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub model: String,
    pub variant: String,
    pub f1: f64,
}

impl EvaluationRecord {
    pub fn new<M: Into<String>, V: Into<String>>(model: M, variant: V, f1: f64) -> Self {
        EvaluationRecord {
            model: model.into(),
            variant: variant.into(),
            f1,
        }
    }
}

/// On-disk entry; the variant lives in the file name.
#[derive(Debug, Serialize, Deserialize)]
struct MetricsEntry {
    model: String,
    f1: f64,
}

/// Name of the metrics file of a variant.
pub fn metrics_file_name(variant: &str) -> String {
    format!("{variant}{METRICS_SUFFIX}")
}

impl FileStore {
    /// Write the records of one variant, replacing any earlier file.
    pub fn write_metrics(&self, variant: &str, records: &[EvaluationRecord]) -> Result<String> {
        if let Some(other) = records.iter().find(|r| r.variant != variant) {
            return Err(SpamCheckError::invalid_input(format!(
                "record for variant '{}' cannot be written to the '{variant}' metrics file",
                other.variant
            )));
        }

        let entries: Vec<MetricsEntry> = records
            .iter()
            .map(|r| MetricsEntry {
                model: r.model.clone(),
                f1: r.f1,
            })
            .collect();

        let name = metrics_file_name(variant);
        self.write_atomic(&name, &serde_json::to_vec_pretty(&entries)?)?;
        Ok(name)
    }

    /// Read every metrics file in name order, tagging each record with the
    /// variant taken from its file name.
    pub fn read_metrics(&self) -> Result<Vec<EvaluationRecord>> {
        let mut records = Vec::new();

        for name in self.list_with_suffix(METRICS_SUFFIX)? {
            let variant = name.strip_suffix(METRICS_SUFFIX).unwrap_or(&name).to_string();
            let entries: Vec<MetricsEntry> = serde_json::from_slice(&self.read(&name)?)
                .map_err(|e| SpamCheckError::invalid_input(format!("corrupt {name}: {e}")))?;

            records.extend(
                entries
                    .into_iter()
                    .map(|entry| EvaluationRecord::new(entry.model, variant.clone(), entry.f1)),
            );
        }

        log::debug!("read {} evaluation records", records.len());
        Ok(records)
    }
}
