//! Offline model selection over persisted evaluation records.

pub mod record;
pub mod selector;

pub use record::{EvaluationRecord, METRICS_SUFFIX, metrics_file_name};
pub use selector::{SelectionFilter, activate, select_best, select_by_filter, select_by_metric};
