//! Choosing the model to activate.
//!
//! Two pure functions cover the two ways of choosing:
//! [`select_by_metric`] picks the best F1 over all records, and
//! [`select_by_filter`] honours a manual model/variant choice.
//! [`select_best`] composes them and [`activate`] repoints the active model.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::selection::record::EvaluationRecord;
use crate::storage::{ActiveModelPointer, FileStore};

/// Manual restriction of the candidate records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionFilter {
    pub model: Option<String>,
    pub variant: Option<String>,
}

impl SelectionFilter {
    pub fn new(model: Option<String>, variant: Option<String>) -> Self {
        SelectionFilter { model, variant }
    }

    /// Filter on one model, any variant.
    pub fn model<S: Into<String>>(model: S) -> Self {
        SelectionFilter {
            model: Some(model.into()),
            variant: None,
        }
    }

    /// Narrow the filter to one variant.
    pub fn with_variant<S: Into<String>>(mut self, variant: S) -> Self {
        self.variant = Some(variant.into());
        self
    }

    fn matches(&self, record: &EvaluationRecord) -> bool {
        self.model.as_ref().is_none_or(|m| *m == record.model)
            && self.variant.as_ref().is_none_or(|v| *v == record.variant)
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(model) = &self.model {
            parts.push(format!("model='{model}'"));
        }
        if let Some(variant) = &self.variant {
            parts.push(format!("variant='{variant}'"));
        }
        parts.join(" and ")
    }
}

/// Higher F1 ranks higher, NaN ranks lowest, and ties go to the
/// lexicographically smaller `(model, variant)`.
fn rank(a: &EvaluationRecord, b: &EvaluationRecord) -> Ordering {
    let by_metric = match (a.f1.is_nan(), b.f1.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.f1.total_cmp(&b.f1),
    };
    by_metric.then_with(|| (&b.model, &b.variant).cmp(&(&a.model, &a.variant)))
}

/// The record with the highest F1.
pub fn select_by_metric(records: &[EvaluationRecord]) -> Result<&EvaluationRecord> {
    best_of(records.iter())
        .ok_or_else(|| SpamCheckError::not_found("No metrics found. Run 'train' first."))
}

fn best_of<'a, I>(records: I) -> Option<&'a EvaluationRecord>
where
    I: Iterator<Item = &'a EvaluationRecord>,
{
    records.max_by(|a, b| rank(a, b))
}

/// The record matching a manual filter.
///
/// A model filter without a variant must match exactly one variant;
/// otherwise the candidate variants are reported back. When several
/// records remain, the best by metric wins.
pub fn select_by_filter<'a>(
    records: &'a [EvaluationRecord],
    filter: &SelectionFilter,
) -> Result<&'a EvaluationRecord> {
    if records.is_empty() {
        return Err(SpamCheckError::not_found("No metrics found. Run 'train' first."));
    }

    let candidates: Vec<&EvaluationRecord> = records
        .iter()
        .filter(|record| filter.matches(record))
        .collect();

    if candidates.is_empty() {
        return Err(SpamCheckError::not_found(format!(
            "No metrics found for {}",
            filter.describe()
        )));
    }

    if let (Some(model), None) = (&filter.model, &filter.variant) {
        let variants: BTreeSet<&str> = candidates.iter().map(|r| r.variant.as_str()).collect();
        if variants.len() > 1 {
            return Err(SpamCheckError::ambiguous(
                model.clone(),
                variants.into_iter().map(String::from).collect(),
            ));
        }
    }

    best_of(candidates.into_iter()).ok_or_else(|| {
        SpamCheckError::not_found(format!("No metrics found for {}", filter.describe()))
    })
}

/// Pick a record: by filter when one is given, otherwise by metric.
pub fn select_best<'a>(
    records: &'a [EvaluationRecord],
    filter: Option<&SelectionFilter>,
) -> Result<&'a EvaluationRecord> {
    let chosen = match filter {
        Some(filter) => select_by_filter(records, filter)?,
        None => select_by_metric(records)?,
    };
    log::info!(
        "selected {} on {} (f1 {:.4})",
        chosen.model,
        chosen.variant,
        chosen.f1
    );
    Ok(chosen)
}

/// Point the active model at the artifact of `record`.
pub fn activate(store: &FileStore, record: &EvaluationRecord) -> Result<ActiveModelPointer> {
    let (kind, path) = store.resolve_artifact(&record.variant, &record.model)?;
    let pointer = ActiveModelPointer::new(&*record.model, &*record.variant, kind, path);
    store.write_pointer(&pointer)?;
    Ok(pointer)
}
