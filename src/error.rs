//! Error types for spamcheck.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! is [`SpamCheckError`]. The variants that callers are expected to match on
//! are [`SpamCheckError::InvalidInput`], [`SpamCheckError::NotFound`] and
//! [`SpamCheckError::AmbiguousSelection`]; the rest describe failures of the
//! surrounding machinery (I/O, serialization, artifacts).
//!
//! # Examples
//!
//! ```
//! use spamcheck::error::{Result, SpamCheckError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SpamCheckError::not_found("no evaluation records"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for spamcheck operations.
#[derive(Error, Debug)]
pub enum SpamCheckError {
    /// I/O errors (artifact files, datasets, pointer swaps)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input that cannot be normalized (e.g. bytes that are not UTF-8)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A lookup matched nothing (selection filters, missing pointer)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A model filter matched several data-split variants
    #[error(
        "Multiple variants for model '{model}': {variants:?}. Specify a variant."
    )]
    AmbiguousSelection {
        /// The model identifier that was requested.
        model: String,
        /// Sorted list of variants the model identifier matched.
        variants: Vec<String>,
    },

    /// Trained model errors (training, loading, prediction)
    #[error("Model error: {0}")]
    Model(String),

    /// Analysis-related errors (regex tables, tokenization)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Dataset errors (missing files, malformed rows)
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary artifact serialization errors
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with SpamCheckError.
pub type Result<T> = std::result::Result<T, SpamCheckError>;

impl SpamCheckError {
    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        SpamCheckError::InvalidInput(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        SpamCheckError::NotFound(msg.into())
    }

    /// Create a new ambiguous selection error.
    pub fn ambiguous<S: Into<String>>(model: S, mut variants: Vec<String>) -> Self {
        variants.sort();
        variants.dedup();
        SpamCheckError::AmbiguousSelection {
            model: model.into(),
            variants,
        }
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        SpamCheckError::Model(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SpamCheckError::Analysis(msg.into())
    }

    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        SpamCheckError::Dataset(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SpamCheckError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SpamCheckError::Other(msg.into())
    }
}
