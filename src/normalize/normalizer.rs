//! Basic and extended canonicalization pipelines.
//!
//! The basic pipeline is, in order:
//!
//! 1. lowercase the whole string,
//! 2. replace every `http://`/`https://` URL with `<url>`,
//! 3. replace every run of decimal digits with `<num>`,
//! 4. trim surrounding whitespace.
//!
//! The extended pipeline runs the basic one and then tokenizes, drops stop
//! words and non-alphabetic tokens, stems, drops stems that are stop words,
//! and joins with single spaces. Stemming is repeated until the stem stops
//! changing, so running the extended pipeline twice changes nothing.
//!
//! The rule tables are written for the basic form, so rule scoring always
//! sees [`Normalizer::normalize_basic`] output. [`Normalizer::refine`] turns
//! that form into whatever the normalizer's kind produces.
//!
//! # Examples
//!
//! ```
//! use spamcheck::normalize::Normalizer;
//!
//! let normalizer = Normalizer::basic().unwrap();
//! let a = normalizer.normalize("Call http://a.co now 123").unwrap();
//! let b = normalizer.normalize("CALL http://b.org NOW 999").unwrap();
//!
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "call <url> now <num>");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    AlphabeticFilter, Analyzer, PatternReplaceCharFilter, PipelineAnalyzer, RegexTokenizer,
    StemFilter, StopFilter,
};
use crate::error::{Result, SpamCheckError};

/// Placeholder inserted for every URL.
pub const URL_PLACEHOLDER: &str = "<url>";

/// Placeholder inserted for every run of digits.
pub const NUM_PLACEHOLDER: &str = "<num>";

const URL_PATTERN: &str = r"https?://\S+";
const NUM_PATTERN: &str = r"\d+";

/// Which canonicalization pipeline to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizerKind {
    /// Lowercase, placeholders, trim.
    #[default]
    Basic,
    /// Basic, then stop words removed, non-alphabetic tokens removed, stemmed.
    Extended,
}

impl fmt::Display for NormalizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizerKind::Basic => write!(f, "basic"),
            NormalizerKind::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for NormalizerKind {
    type Err = SpamCheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(NormalizerKind::Basic),
            "extended" => Ok(NormalizerKind::Extended),
            other => Err(SpamCheckError::config(format!(
                "unknown normalizer '{other}', expected 'basic' or 'extended'"
            ))),
        }
    }
}

/// Text produced by a [`Normalizer`].
///
/// Only a normalizer can create one, so any function taking a
/// `&CanonicalText` is guaranteed to see normalized input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalText(String);

impl CanonicalText {
    /// The canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the owned string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the canonical form is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CanonicalText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Borrow `bytes` as text, rejecting anything that is not UTF-8.
pub fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| SpamCheckError::invalid_input(format!("message is not valid UTF-8: {e}")))
}

/// Deterministic text-to-canonical-string transform.
#[derive(Clone, Debug)]
pub struct Normalizer {
    kind: NormalizerKind,
    analyzer: PipelineAnalyzer,
}

impl Normalizer {
    /// Build the pipeline for `kind`.
    pub fn new(kind: NormalizerKind) -> Result<Self> {
        let analyzer = PipelineAnalyzer::new(Arc::new(RegexTokenizer::new()?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                URL_PATTERN,
                URL_PLACEHOLDER,
            )?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                NUM_PATTERN,
                NUM_PLACEHOLDER,
            )?))
            .add_filter(Arc::new(StopFilter::new()))
            .add_filter(Arc::new(AlphabeticFilter::new([
                URL_PLACEHOLDER,
                NUM_PLACEHOLDER,
            ])))
            .add_filter(Arc::new(StemFilter::new().repeat_until_stable()))
            // "ins" stems to "in"
            .add_filter(Arc::new(StopFilter::new()))
            .with_name(format!("normalizer_{kind}"));

        Ok(Normalizer { kind, analyzer })
    }

    /// The basic pipeline.
    pub fn basic() -> Result<Self> {
        Self::new(NormalizerKind::Basic)
    }

    /// The extended pipeline.
    pub fn extended() -> Result<Self> {
        Self::new(NormalizerKind::Extended)
    }

    /// Which pipeline this normalizer runs.
    pub fn kind(&self) -> NormalizerKind {
        self.kind
    }

    /// Canonicalize one message with this normalizer's pipeline.
    pub fn normalize(&self, text: &str) -> Result<CanonicalText> {
        let basic = self.normalize_basic(text)?;
        self.refine(&basic)
    }

    /// Canonicalize one message with the basic pipeline, whatever the kind.
    pub fn normalize_basic(&self, text: &str) -> Result<CanonicalText> {
        let lowered = text.to_lowercase();
        let canonical = self.analyzer.apply_char_filters(&lowered).trim().to_string();
        Ok(CanonicalText(canonical))
    }

    /// Take basic canonical text the rest of the way through this
    /// normalizer's pipeline. A no-op for the basic kind.
    pub fn refine(&self, basic: &CanonicalText) -> Result<CanonicalText> {
        match self.kind {
            NormalizerKind::Basic => Ok(basic.clone()),
            NormalizerKind::Extended => {
                let words: Vec<String> = self
                    .analyzer
                    .analyze(basic.as_str())?
                    .map(|token| token.text)
                    .collect();
                Ok(CanonicalText(words.join(" ")))
            }
        }
    }

    /// Canonicalize raw bytes, rejecting anything that is not UTF-8.
    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<CanonicalText> {
        self.normalize(decode_utf8(bytes)?)
    }

    /// Canonicalize a batch of messages in parallel, preserving order.
    pub fn normalize_all<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<CanonicalText>> {
        texts
            .par_iter()
            .map(|text| self.normalize(text.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_steps() {
        let normalizer = Normalizer::basic().unwrap();

        let canonical = normalizer
            .normalize("  Visit HTTPS://Example.com/Path?x=1 and win 1000 dollars  ")
            .unwrap();

        assert_eq!(canonical.as_str(), "visit <url> and win <num> dollars");
    }

    #[test]
    fn test_equivalence_of_urls_numbers_and_case() {
        let normalizer = Normalizer::basic().unwrap();

        let a = normalizer.normalize("Call http://a.co now 123").unwrap();
        let b = normalizer.normalize("CALL http://b.org NOW 999").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.as_str(), "call <url> now <num>");
    }

    #[test]
    fn test_idempotence() {
        let samples = [
            "Check out http://spam.example/ref=42 NOW!!!",
            "  <URL> and <NUM> already there 12ab34 ",
            "http:// dangling scheme 7",
            "ÀÉÎ unicode ٣٤ digits",
            "",
            // stems that are stop words or stem again
            "ins",
            "ons ats",
            "we agreed on generalizations",
            "Subscribe to my channels at http://x.io for 100 giveaways, 2day!",
        ];

        for normalizer in [Normalizer::basic().unwrap(), Normalizer::extended().unwrap()] {
            for sample in samples {
                let once = normalizer.normalize(sample).unwrap();
                let twice = normalizer.normalize(once.as_str()).unwrap();
                assert_eq!(
                    once,
                    twice,
                    "{} not idempotent for {sample:?}",
                    normalizer.kind()
                );
            }
        }
    }

    #[test]
    fn test_stems_that_are_stop_words_are_dropped() {
        let normalizer = Normalizer::extended().unwrap();

        assert_eq!(normalizer.normalize("ins").unwrap().as_str(), "");
        assert_eq!(normalizer.normalize("ons and ats").unwrap().as_str(), "");
        assert_eq!(normalizer.normalize("agreed").unwrap().as_str(), "agr");
    }

    #[test]
    fn test_basic_form_then_refine() {
        let extended = Normalizer::extended().unwrap();
        let text = "Click here to WIN 100 prizes!";

        let basic = extended.normalize_basic(text).unwrap();
        assert_eq!(basic.as_str(), "click here to win <num> prizes!");
        assert_eq!(extended.refine(&basic).unwrap(), extended.normalize(text).unwrap());
        assert_eq!(extended.normalize(text).unwrap().as_str(), "click win <num> prize");

        let plain = Normalizer::basic().unwrap();
        assert_eq!(plain.refine(&basic).unwrap(), basic);
    }

    #[test]
    fn test_digit_runs_are_maximal() {
        let normalizer = Normalizer::basic().unwrap();
        let canonical = normalizer.normalize("a1b22c333").unwrap();
        assert_eq!(canonical.as_str(), "a<num>b<num>c<num>");
    }

    #[test]
    fn test_extended_pipeline() {
        let normalizer = Normalizer::extended().unwrap();

        let canonical = normalizer
            .normalize("Subscribe to my channels at http://x.io for 100 giveaways, 2day!")
            .unwrap();

        // "2day" splits into the placeholder and the word after it
        assert_eq!(
            canonical.as_str(),
            "subscrib channel <url> <num> giveawai <num> dai"
        );
        assert_eq!(normalizer.kind(), NormalizerKind::Extended);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let normalizer = Normalizer::basic().unwrap();

        let err = normalizer.normalize_bytes(&[0x66, 0x72, 0xff, 0x65]).unwrap_err();
        assert!(matches!(err, SpamCheckError::InvalidInput(_)));

        let ok = normalizer.normalize_bytes("FREE 5".as_bytes()).unwrap();
        assert_eq!(ok.as_str(), "free <num>");
    }

    #[test]
    fn test_normalize_all_preserves_order() {
        let normalizer = Normalizer::basic().unwrap();
        let texts = vec!["A 1".to_string(), "B 2".to_string(), "C".to_string()];

        let canonical = normalizer.normalize_all(&texts).unwrap();
        let strings: Vec<&str> = canonical.iter().map(|c| c.as_str()).collect();

        assert_eq!(strings, vec!["a <num>", "b <num>", "c"]);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Extended".parse::<NormalizerKind>().unwrap(), NormalizerKind::Extended);
        assert_eq!(NormalizerKind::default().to_string(), "basic");
        assert!("lemma".parse::<NormalizerKind>().is_err());
    }
}
