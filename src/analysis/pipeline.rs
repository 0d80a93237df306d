//! Composable analysis pipeline.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use spamcheck::analysis::{Analyzer, PipelineAnalyzer, RegexTokenizer, StemFilter, StopFilter};
//!
//! let analyzer = PipelineAnalyzer::new(Arc::new(RegexTokenizer::new().unwrap()))
//!     .add_filter(Arc::new(StopFilter::new()))
//!     .add_filter(Arc::new(StemFilter::new()));
//!
//! let words: Vec<String> = analyzer
//!     .analyze("grab the offers")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(words, vec!["grab", "offer"]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::analysis::char_filter::CharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// Turns a string into a stream of filtered tokens.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Identifier shown in `Debug` output and logs.
    fn name(&self) -> &str;
}

/// Char filters, then a tokenizer, then token filters, each in insertion order.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    name: String,
    char_filters: Vec<Arc<dyn CharFilter>>,
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
}

impl PipelineAnalyzer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            char_filters: Vec::new(),
            tokenizer,
            filters: Vec::new(),
        }
    }

    pub fn add_char_filter(mut self, char_filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(char_filter);
        self
    }

    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Run only the char filters.
    pub fn apply_char_filters(&self, text: &str) -> String {
        self.char_filters
            .iter()
            .fold(text.to_string(), |acc, char_filter| char_filter.filter(&acc))
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let rewritten = self.apply_char_filters(text);
        self.filters
            .iter()
            .try_fold(self.tokenizer.tokenize(&rewritten)?, |tokens, filter| {
                filter.filter(tokens)
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let char_filters: Vec<_> = self.char_filters.iter().map(|c| c.name()).collect();
        let filters: Vec<_> = self.filters.iter().map(|t| t.name()).collect();
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("char_filters", &char_filters)
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &filters)
            .finish()
    }
}
