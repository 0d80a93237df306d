//! Shared utility modules.

pub mod similarity;
