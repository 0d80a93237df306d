//! Token filters applied after tokenization.
//!
//! Each filter wraps the incoming stream lazily; nothing is collected until
//! the pipeline's caller drains it.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::stemmer::{PorterStemmer, Stemmer};
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

static ENGLISH_STOP_SET: LazyLock<Arc<HashSet<String>>> = LazyLock::new(|| {
    Arc::new(ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect())
});

/// Drops stop words.
#[derive(Clone, Debug)]
pub struct StopFilter {
    words: Arc<HashSet<String>>,
}

impl StopFilter {
    /// English function words.
    pub fn new() -> Self {
        StopFilter {
            words: Arc::clone(&ENGLISH_STOP_SET),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopFilter {
            words: Arc::new(words.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words = Arc::clone(&self.words);
        Ok(Box::new(tokens.filter(move |t| !words.contains(&t.text))))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

/// Keeps tokens made only of letters, plus an allow-list of literals.
///
/// The allow-list is how the `<url>` and `<num>` placeholders survive the
/// extended pipeline.
#[derive(Clone, Debug)]
pub struct AlphabeticFilter {
    keep: Arc<[String]>,
}

impl AlphabeticFilter {
    pub fn new<I, S>(keep: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AlphabeticFilter {
            keep: keep.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filter for AlphabeticFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let keep = Arc::clone(&self.keep);
        Ok(Box::new(tokens.filter(move |t| {
            keep.contains(&t.text) || (!t.text.is_empty() && t.text.chars().all(char::is_alphabetic))
        })))
    }

    fn name(&self) -> &'static str {
        "alphabetic"
    }
}

/// Replaces each token with its stem.
#[derive(Clone)]
pub struct StemFilter {
    stemmer: Arc<dyn Stemmer>,
    until_stable: bool,
}

impl std::fmt::Debug for StemFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StemFilter")
            .field("stemmer", &self.stemmer.name())
            .field("until_stable", &self.until_stable)
            .finish()
    }
}

impl StemFilter {
    /// Porter stemming.
    pub fn new() -> Self {
        Self::with_stemmer(Arc::new(PorterStemmer::new()))
    }

    pub fn with_stemmer(stemmer: Arc<dyn Stemmer>) -> Self {
        StemFilter {
            stemmer,
            until_stable: false,
        }
    }

    /// Stem each token again until the stem no longer changes.
    ///
    /// A single Porter pass is not idempotent (`agreed` -> `agre` -> `agr`).
    pub fn repeat_until_stable(mut self) -> Self {
        self.until_stable = true;
        self
    }
}

impl Default for StemFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Stem until a fixed point. Porter stems are never longer than their
/// input, and a same-length stem only moves the last letter from `y` to `i`
/// or from `i` to `e`, so this terminates.
fn stem_to_fixed_point(stemmer: &dyn Stemmer, word: &str) -> String {
    let mut current = stemmer.stem(word);
    loop {
        let next = stemmer.stem(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

impl Filter for StemFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stemmer = Arc::clone(&self.stemmer);
        let until_stable = self.until_stable;
        Ok(Box::new(tokens.map(move |t| {
            let stem = if until_stable {
                stem_to_fixed_point(stemmer.as_ref(), &t.text)
            } else {
                stemmer.stem(&t.text)
            };
            t.with_text(stem)
        })))
    }

    fn name(&self) -> &'static str {
        "stem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::{Token, stream};

    fn texts(filter: &dyn Filter, words: &[&str]) -> Vec<String> {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        filter
            .filter(stream(tokens))
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_stop_filter() {
        let filter = StopFilter::from_words(["the", "and"]);
        assert_eq!(
            texts(&filter, &["grab", "the", "deal", "and", "run"]),
            vec!["grab", "deal", "run"]
        );
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_default_stop_words() {
        let filter = StopFilter::default();
        assert!(filter.is_stop_word("your"));
        assert!(!filter.is_stop_word("free"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_alphabetic_filter() {
        let filter = AlphabeticFilter::new(["<num>"]);
        assert_eq!(
            texts(&filter, &["win", "<num>", "x2", "", "café", "<url>"]),
            vec!["win", "<num>", "café"]
        );
    }

    #[test]
    fn test_stem_filter_keeps_positions() {
        let filter = StemFilter::new();
        let tokens = vec![Token::new("running", 4), Token::new("offers", 7)];

        let out: Vec<Token> = filter.filter(stream(tokens)).unwrap().collect();
        assert_eq!(out, vec![Token::new("run", 4), Token::new("offer", 7)]);
        assert_eq!(
            format!("{filter:?}"),
            "StemFilter { stemmer: \"porter\", until_stable: false }"
        );
    }

    #[test]
    fn test_stem_until_stable() {
        let once = StemFilter::new();
        let stable = StemFilter::new().repeat_until_stable();

        assert_eq!(texts(&once, &["agreed", "offers"]), vec!["agre", "offer"]);
        assert_eq!(texts(&stable, &["agreed", "offers"]), vec!["agr", "offer"]);
        assert_eq!(texts(&stable, &["agr"]), vec!["agr"]);
    }
}
