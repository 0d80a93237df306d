//! Labelled comment datasets: CSV loading and train/test split variants.

pub mod loader;
pub mod split;

pub use loader::{CsvDatasetLoader, LabeledText};
pub use split::{SplitVariant, TrainTestSplit};
