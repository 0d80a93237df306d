//! Tokenizers split text into [`Token`]s.

use std::sync::Arc;

use regex::Regex;

use crate::analysis::token::{Token, TokenStream, stream};
use crate::error::{Result, SpamCheckError};

/// Trait for tokenizers that convert text into tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// Placeholders stay whole; everything else splits into runs of word
/// characters.
pub const CANONICAL_TOKEN_PATTERN: &str = r"<url>|<num>|\w+";

/// Emits every match of a regex, in order.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    pattern: Arc<Regex>,
}

impl RegexTokenizer {
    /// Tokenizer for canonical text.
    pub fn new() -> Result<Self> {
        Self::with_pattern(CANONICAL_TOKEN_PATTERN)
    }

    pub fn with_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            SpamCheckError::analysis(format!("invalid tokenizer pattern {pattern:?}: {e}"))
        })?;
        Ok(RegexTokenizer {
            pattern: Arc::new(regex),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Borrowed token texts without building [`Token`]s.
    pub fn words<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern.find_iter(text).map(|m| m.as_str())
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        Ok(stream(
            self.words(text)
                .enumerate()
                .map(|(position, word)| Token::new(word, position))
                .collect(),
        ))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}
