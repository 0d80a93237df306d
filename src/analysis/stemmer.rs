//! Stemmers reduce inflected words to a common stem.
//!
//! [`PorterStemmer`] follows M.F. Porter's 1980 suffix-stripping algorithm.
//! It works on ASCII words only; anything else, including the `<url>` and
//! `<num>` placeholders, is returned unchanged.
//!
//! # Examples
//!
//! ```
//! use spamcheck::analysis::stemmer::{PorterStemmer, Stemmer};
//!
//! let stemmer = PorterStemmer::new();
//!
//! assert_eq!(stemmer.stem("subscribers"), "subscrib");
//! assert_eq!(stemmer.stem("giveaways"), "giveawai");
//! assert_eq!(stemmer.stem("<url>"), "<url>");
//! ```

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Porter stemming over ASCII words.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub fn new() -> Self {
        PorterStemmer
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        if !word.bytes().all(|b| b.is_ascii_alphabetic()) {
            return word.to_string();
        }

        let mut w = word.to_ascii_lowercase().into_bytes();
        if w.len() > 2 {
            step1a(&mut w);
            step1b(&mut w);
            step1c(&mut w);
            step2(&mut w);
            step3(&mut w);
            step4(&mut w);
            step5(&mut w);
        }

        // only ASCII letters were ever written
        String::from_utf8(w).unwrap_or_else(|_| word.to_string())
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant sequences, the `m` in `[C](VC)^m[V]`.
fn measure(w: &[u8]) -> usize {
    let mut i = 0;
    let mut m = 0;

    while i < w.len() && is_consonant(w, i) {
        i += 1;
    }
    loop {
        while i < w.len() && !is_consonant(w, i) {
            i += 1;
        }
        if i == w.len() {
            return m;
        }
        m += 1;
        while i < w.len() && is_consonant(w, i) {
            i += 1;
        }
    }
}

fn has_vowel(w: &[u8]) -> bool {
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// consonant-vowel-consonant, the last one not `w`, `x` or `y`
fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

/// Length of the stem left when `suffix` is cut off, if `w` ends with it.
fn stem_len(w: &[u8], suffix: &str) -> Option<usize> {
    w.ends_with(suffix.as_bytes()).then(|| w.len() - suffix.len())
}

fn replace_tail(w: &mut Vec<u8>, stem: usize, replacement: &str) {
    w.truncate(stem);
    w.extend_from_slice(replacement.as_bytes());
}

/// Apply the rule with the longest matching suffix when its stem has
/// `m > 0`. Shorter rules are not tried if the longest one is rejected.
fn apply_longest(w: &mut Vec<u8>, rules: &[(&str, &str)]) {
    let best = rules
        .iter()
        .filter_map(|&(suffix, replacement)| stem_len(w, suffix).map(|j| (j, replacement)))
        .min_by_key(|&(j, _)| j);

    if let Some((j, replacement)) = best {
        if measure(&w[..j]) > 0 {
            replace_tail(w, j, replacement);
        }
    }
}

fn step1a(w: &mut Vec<u8>) {
    if let Some(j) = stem_len(w, "sses") {
        replace_tail(w, j, "ss");
    } else if let Some(j) = stem_len(w, "ies") {
        replace_tail(w, j, "i");
    } else if w.ends_with(b"s") && !w.ends_with(b"ss") {
        w.pop();
    }
}

fn step1b(w: &mut Vec<u8>) {
    if let Some(j) = stem_len(w, "eed") {
        if measure(&w[..j]) > 0 {
            w.pop();
        }
        return;
    }

    let stripped = ["ed", "ing"]
        .iter()
        .filter_map(|suffix| stem_len(w, suffix))
        .find(|&j| has_vowel(&w[..j]));
    let Some(j) = stripped else {
        return;
    };
    w.truncate(j);

    if w.ends_with(b"at") || w.ends_with(b"bl") || w.ends_with(b"iz") {
        w.push(b'e');
    } else if ends_double_consonant(w) && !matches!(w[w.len() - 1], b'l' | b's' | b'z') {
        w.pop();
    } else if measure(w) == 1 && ends_cvc(w) {
        w.push(b'e');
    }
}

fn step1c(w: &mut [u8]) {
    let n = w.len();
    if w[n - 1] == b'y' && has_vowel(&w[..n - 1]) {
        w[n - 1] = b'i';
    }
}

fn step2(w: &mut Vec<u8>) {
    apply_longest(w, STEP2_RULES);
}

fn step3(w: &mut Vec<u8>) {
    apply_longest(w, STEP3_RULES);
}

fn step4(w: &mut Vec<u8>) {
    let Some(j) = STEP4_SUFFIXES
        .iter()
        .filter_map(|suffix| stem_len(w, suffix))
        .min()
    else {
        return;
    };

    let stem = &w[..j];
    let is_ion = w[j..] == *b"ion";
    if measure(stem) > 1 && (!is_ion || matches!(stem.last(), Some(b's' | b't'))) {
        w.truncate(j);
    }
}

fn step5(w: &mut Vec<u8>) {
    if let Some(j) = stem_len(w, "e") {
        let m = measure(&w[..j]);
        if m > 1 || (m == 1 && !ends_cvc(&w[..j])) {
            w.truncate(j);
        }
    }

    if measure(w) > 1 && ends_double_consonant(w) && w.ends_with(b"l") {
        w.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(word: &str) -> String {
        PorterStemmer::new().stem(word)
    }

    #[test]
    fn test_step1() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("cats"), "cat");
        assert_eq!(stem("feed"), "feed");
        assert_eq!(stem("agreed"), "agre");
        assert_eq!(stem("plastered"), "plaster");
        assert_eq!(stem("motoring"), "motor");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("filing"), "file");
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("sky"), "sky");
    }

    #[test]
    fn test_later_steps() {
        assert_eq!(stem("relational"), "relat");
        assert_eq!(stem("conditional"), "condit");
        assert_eq!(stem("triplicate"), "triplic");
        assert_eq!(stem("revival"), "reviv");
        assert_eq!(stem("generalizations"), "gener");
        assert_eq!(stem("controll"), "control");
        assert_eq!(stem("roll"), "roll");
    }

    #[test]
    fn test_comment_vocabulary() {
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("offers"), "offer");
        assert_eq!(stem("channels"), "channel");
        assert_eq!(stem("subscribe"), "subscrib");
        assert_eq!(stem("Deals"), "deal");
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure(b"tree"), 0);
        assert_eq!(measure(b"trees"), 1);
        assert_eq!(measure(b"trouble"), 1);
        assert_eq!(measure(b"troubles"), 2);
    }

    #[test]
    fn test_non_ascii_passthrough() {
        assert_eq!(stem("cafés"), "cafés");
        assert_eq!(stem("<num>"), "<num>");
        assert_eq!(stem("is"), "is");
    }
}
