//! TF-IDF vectorizer for canonical text.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::RegexTokenizer;
use crate::error::{Result, SpamCheckError};
use crate::normalize::CanonicalText;

/// Sparse feature vector as `(index, value)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// Dot product of a sparse vector with a dense one.
pub fn sparse_dot(x: &SparseVector, dense: &[f64]) -> f64 {
    x.iter()
        .filter_map(|&(idx, value)| dense.get(idx).map(|w| w * value))
        .sum()
}

/// Feature extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfConfig {
    /// Smallest word n-gram.
    pub min_ngram: usize,
    /// Largest word n-gram.
    pub max_ngram: usize,
    /// Terms seen in fewer documents are dropped.
    pub min_df: usize,
    /// Terms seen in more than this fraction of documents are dropped.
    pub max_df: f64,
    /// Use `1 + ln(tf)` instead of the raw count.
    pub sublinear_tf: bool,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        TfIdfConfig {
            min_ngram: 1,
            max_ngram: 2,
            min_df: 2,
            max_df: 0.9,
            sublinear_tf: true,
        }
    }
}

/// TF-IDF vectorizer producing L2-normalized sparse vectors.
#[derive(Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
    /// Term -> feature index.
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature.
    idf: Vec<f64>,
    /// Number of documents seen by `fit`.
    n_documents: usize,
    #[serde(skip)]
    tokenizer: OnceLock<RegexTokenizer>,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("config", &self.config)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: TfIdfConfig) -> Result<Self> {
        if config.min_ngram == 0 || config.min_ngram > config.max_ngram {
            return Err(SpamCheckError::config(format!(
                "invalid n-gram range {}..={}",
                config.min_ngram, config.max_ngram
            )));
        }
        if !(config.max_df > 0.0 && config.max_df <= 1.0) {
            return Err(SpamCheckError::config(format!(
                "max_df must be within (0, 1], got {}",
                config.max_df
            )));
        }

        Ok(Self {
            config,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            tokenizer: OnceLock::new(),
        })
    }

    fn tokenizer(&self) -> Result<&RegexTokenizer> {
        if let Some(tokenizer) = self.tokenizer.get() {
            return Ok(tokenizer);
        }
        let tokenizer = RegexTokenizer::new()?;
        Ok(self.tokenizer.get_or_init(|| tokenizer))
    }

    /// Word n-grams of a document, in order of appearance.
    fn terms(&self, document: &str) -> Result<Vec<String>> {
        let words: Vec<&str> = self.tokenizer()?.words(document).collect();
        let mut terms = Vec::new();

        for n in self.config.min_ngram..=self.config.max_ngram {
            if n > words.len() {
                break;
            }
            terms.extend(words.windows(n).map(|window| window.join(" ")));
        }

        Ok(terms)
    }

    /// Learn the vocabulary and idf weights.
    pub fn fit(&mut self, documents: &[CanonicalText]) -> Result<()> {
        if documents.is_empty() {
            return Err(SpamCheckError::invalid_input(
                "cannot fit a vectorizer on zero documents",
            ));
        }

        self.n_documents = documents.len();
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for doc in documents {
            let unique: HashSet<String> = self.terms(doc.as_str())?.into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let max_count = self.config.max_df * self.n_documents as f64;
        let mut kept: Vec<(&String, usize)> = document_frequency
            .iter()
            .filter(|(_, df)| **df >= self.config.min_df && **df as f64 <= max_count)
            .map(|(term, df)| (term, *df))
            .collect();

        if kept.is_empty() {
            log::warn!(
                "document frequency bounds pruned all {} terms; keeping the full vocabulary",
                document_frequency.len()
            );
            kept = document_frequency
                .iter()
                .map(|(term, df)| (term, *df))
                .collect();
        }

        if kept.is_empty() {
            return Err(SpamCheckError::invalid_input(
                "training documents contain no terms",
            ));
        }

        // BTreeMap iteration keeps the feature order deterministic
        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            vocabulary.insert(term.clone(), idx);
            // IDF = ln((N + 1) / (df + 1)) + 1
            idf.push(((self.n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
        }

        log::debug!(
            "fitted tf-idf vocabulary of {} terms over {} documents",
            vocabulary.len(),
            self.n_documents
        );

        self.vocabulary = vocabulary;
        self.idf = idf;

        Ok(())
    }

    /// Transform one document into an L2-normalized sparse vector.
    ///
    /// Terms outside the vocabulary are ignored, so a document made only of
    /// unseen terms maps to the empty vector.
    pub fn transform(&self, document: &CanonicalText) -> Result<SparseVector> {
        if self.vocabulary.is_empty() {
            return Err(SpamCheckError::model("vectorizer has not been fitted"));
        }

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.terms(document.as_str())? {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.config.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect();

        let norm = vector.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }

    /// Transform a batch of documents.
    pub fn transform_all(&self, documents: &[CanonicalText]) -> Result<Vec<SparseVector>> {
        documents.iter().map(|doc| self.transform(doc)).collect()
    }

    /// Fit on `documents` and return their vectors.
    pub fn fit_transform(&mut self, documents: &[CanonicalText]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        self.transform_all(documents)
    }

    /// Number of features.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents the vectorizer was fitted on.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Feature index of a term, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }
}
