//! String similarity used for fuzzy template matching.
//!
//! The similarity ratio is the normalized insertion/deletion (Indel) distance
//! on a 0–100 scale: `100 * (1 - indel / (len_a + len_b))`, counted over
//! Unicode scalar values. Identical strings score 100, strings with no
//! common subsequence score 0.

use std::cmp::max;

/// Length of the longest common subsequence of two strings, in chars.
#[allow(clippy::needless_range_loop)]
pub fn lcs_length(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len2 = s2_chars.len();

    if s1_chars.is_empty() || len2 == 0 {
        return 0;
    }

    // Use only two rows for space optimization
    let mut prev_row = vec![0usize; len2 + 1];
    let mut curr_row = vec![0usize; len2 + 1];

    for &c1 in &s1_chars {
        for j in 1..=len2 {
            curr_row[j] = if c1 == s2_chars[j - 1] {
                prev_row[j - 1] + 1
            } else {
                max(prev_row[j], curr_row[j - 1])
            };
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

/// Minimum number of single-character insertions and deletions turning one
/// string into the other.
pub fn indel_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    len1 + len2 - 2 * lcs_length(s1, s2)
}

/// Similarity ratio between two strings on a 0–100 scale.
///
/// Two empty strings are identical and score 100.
pub fn ratio(s1: &str, s2: &str) -> f64 {
    let total = s1.chars().count() + s2.chars().count();
    if total == 0 {
        return 100.0;
    }
    100.0 * (total - indel_distance(s1, s2)) as f64 / total as f64
}

/// Highest ratio two strings of these lengths (in chars) can reach.
///
/// The longest common subsequence is at most the shorter length, so the
/// ratio is bounded by `200 * min / (len1 + len2)`.
pub fn ratio_upper_bound(len1: usize, len2: usize) -> f64 {
    let total = len1 + len2;
    if total == 0 {
        return 100.0;
    }
    200.0 * len1.min(len2) as f64 / total as f64
}

/// Find the best-scoring choice whose ratio meets `score_cutoff`.
///
/// Returns the index of the choice and its ratio. On equal ratios the
/// earliest choice wins. Choices whose length alone rules them out are
/// skipped without computing the ratio.
pub fn best_match<S: AsRef<str>>(
    query: &str,
    choices: &[S],
    score_cutoff: f64,
) -> Option<(usize, f64)> {
    best_match_with(query, choices, score_cutoff, ratio)
}

fn best_match_with<S, F>(
    query: &str,
    choices: &[S],
    score_cutoff: f64,
    mut scorer: F,
) -> Option<(usize, f64)>
where
    S: AsRef<str>,
    F: FnMut(&str, &str) -> f64,
{
    let query_len = query.chars().count();
    let mut best: Option<(usize, f64)> = None;

    for (idx, choice) in choices.iter().enumerate() {
        let choice = choice.as_ref();
        let bound = ratio_upper_bound(query_len, choice.chars().count());
        if bound < score_cutoff || best.is_some_and(|(_, b)| bound <= b) {
            continue;
        }

        let score = scorer(query, choice);
        if score >= score_cutoff && best.is_none_or(|(_, b)| score > b) {
            best = Some((idx, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcs_length() {
        assert_eq!(lcs_length("abcde", "ace"), 3);
        assert_eq!(lcs_length("", "abc"), 0);
        assert_eq!(lcs_length("abc", "xyz"), 0);
    }

    #[test]
    fn test_indel_distance() {
        assert_eq!(indel_distance("kitten", "sitting"), 5);
        assert_eq!(indel_distance("same", "same"), 0);
        assert_eq!(indel_distance("", "abc"), 3);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("click here", "click here"), 100.0);
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", ""), 0.0);
        // lcs("this is a test", "this is a test!") = 14, total = 29
        let r = ratio("this is a test", "this is a test!");
        assert!((r - 100.0 * 28.0 / 29.0).abs() < 1e-9);
    }

    #[test]
    fn test_ratio_counts_chars_not_bytes() {
        // "earn €5" vs "earn €6": 7 chars each, 6 shared
        let r = ratio("earn €5", "earn €6");
        assert!((r - 100.0 * 12.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_match() {
        let choices = ["visit my website", "click here", "contact now"];
        let best = best_match("click here!", &choices, 80.0).unwrap();
        assert_eq!(best.0, 1);
        assert!(best.1 >= 80.0);

        assert!(best_match("completely unrelated words", &choices, 80.0).is_none());
    }

    #[test]
    fn test_ratio_upper_bound() {
        assert_eq!(ratio_upper_bound(0, 0), 100.0);
        assert_eq!(ratio_upper_bound(10, 10), 100.0);
        assert_eq!(ratio_upper_bound(0, 5), 0.0);
        // 200 * 10 / 40
        assert_eq!(ratio_upper_bound(30, 10), 50.0);
        assert!(ratio_upper_bound(10, 10) >= ratio("click here", "click hare"));
    }

    #[test]
    fn test_long_query_skips_every_choice() {
        let query = "spam ".repeat(50_000);
        let choices = ["visit my website", "click here", "contact now"];
        let mut calls = 0;

        let best = best_match_with(&query, &choices, 80.0, |a, b| {
            calls += 1;
            ratio(a, b)
        });

        assert!(best.is_none());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_choices_that_cannot_win_are_skipped() {
        let choices = ["click here", "click here now and forever", "click"];
        let mut scored = Vec::new();

        let best = best_match_with("click here", &choices, 0.0, |a, b| {
            scored.push(b.to_string());
            ratio(a, b)
        });

        // an exact match is found first, nothing after it can beat 100
        assert_eq!(best, Some((0, 100.0)));
        assert_eq!(scored, vec!["click here"]);
    }
}
