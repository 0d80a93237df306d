//! Combining rule and classifier signals into a verdict.

pub mod fuser;

pub use fuser::{DecisionFuser, Thresholds, Verdict, fuse};
