//! Char filters rewrite the raw string before it is tokenized.
//!
//! The URL and digit-run placeholders are char filters, which is what lets
//! the basic pipeline skip tokenization entirely.

use regex::{NoExpand, Regex};

use crate::error::{Result, SpamCheckError};

/// Trait for rewrites applied to the whole text.
pub trait CharFilter: Send + Sync {
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

/// Replaces every leftmost-longest match of a pattern with a literal.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// `replacement` is inserted verbatim; `$` references are not expanded.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            SpamCheckError::analysis(format!("invalid char filter pattern {pattern:?}: {e}"))
        })?;
        Ok(PatternReplaceCharFilter {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, NoExpand(&self.replacement))
            .into_owned()
    }

    fn name(&self) -> &'static str {
        "pattern_replace"
    }
}
