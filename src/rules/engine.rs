//! Keyword and fuzzy-template scoring.

use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::normalize::CanonicalText;
use crate::rules::tables::{DEFAULT_SPAM_KEYWORDS, DEFAULT_SPAM_TEMPLATES};
use crate::util::similarity;

/// Weights, cutoff and (optionally) replacement tables for the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Points added per matching keyword pattern.
    pub keyword_weight: u32,
    /// Points added when the best template reaches the cutoff.
    pub template_bonus: u32,
    /// Minimum fuzzy ratio (0-100) for a template hit.
    pub template_cutoff: f64,
    /// Replacement keyword patterns. `None` keeps the built-in table.
    pub keywords: Option<Vec<String>>,
    /// Replacement template phrases. `None` keeps the built-in table.
    pub templates: Option<Vec<String>>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            keyword_weight: 1,
            template_bonus: 2,
            template_cutoff: 80.0,
            keywords: None,
            templates: None,
        }
    }
}

/// The closest template to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    pub template: String,
    pub ratio: f64,
}

/// Breakdown of how a rule score was reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleReport {
    /// Same value [`RuleEngine::score`] returns.
    pub score: u32,
    /// Source patterns of the keywords that matched, in table order.
    pub keyword_matches: Vec<String>,
    /// Closest template regardless of the cutoff.
    pub best_template: Option<TemplateMatch>,
    /// Whether the closest template reached the cutoff.
    pub template_hit: bool,
}

/// Scores canonical text against fixed keyword and template tables.
///
/// The tables are compiled once and never change afterwards, so an engine
/// can be shared across threads behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct RuleEngine {
    keywords: Arc<Vec<Regex>>,
    templates: Arc<Vec<String>>,
    keyword_weight: u32,
    template_bonus: u32,
    template_cutoff: f64,
}

impl RuleEngine {
    /// Build an engine from a configuration.
    pub fn new(config: &RuleConfig) -> Result<Self> {
        let keywords: Vec<String> = match &config.keywords {
            Some(keywords) => keywords.clone(),
            None => DEFAULT_SPAM_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        };
        let templates: Vec<String> = match &config.templates {
            Some(templates) => templates.clone(),
            None => DEFAULT_SPAM_TEMPLATES.iter().map(|s| s.to_string()).collect(),
        };

        Self::with_tables(
            &keywords,
            &templates,
            config.keyword_weight,
            config.template_bonus,
            config.template_cutoff,
        )
    }

    /// Build an engine from explicit tables.
    pub fn with_tables<S: AsRef<str>, T: AsRef<str>>(
        keywords: &[S],
        templates: &[T],
        keyword_weight: u32,
        template_bonus: u32,
        template_cutoff: f64,
    ) -> Result<Self> {
        if !(0.0..=100.0).contains(&template_cutoff) {
            return Err(SpamCheckError::config(format!(
                "template cutoff must be within 0..=100, got {template_cutoff}"
            )));
        }

        let keywords = keywords
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        SpamCheckError::analysis(format!(
                            "Invalid keyword pattern '{}': {e}",
                            pattern.as_ref()
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let templates = templates
            .iter()
            .map(|template| template.as_ref().to_lowercase())
            .collect();

        Ok(RuleEngine {
            keywords: Arc::new(keywords),
            templates: Arc::new(templates),
            keyword_weight,
            template_bonus,
            template_cutoff,
        })
    }

    /// Number of keyword patterns.
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    /// Number of template phrases.
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Score a canonical message.
    pub fn score(&self, text: &CanonicalText) -> u32 {
        let text = text.as_str();

        let keyword_score = self
            .keywords
            .iter()
            .filter(|pattern| pattern.is_match(text))
            .count() as u32
            * self.keyword_weight;

        let template_hit =
            similarity::best_match(text, self.templates.as_slice(), self.template_cutoff).is_some();
        let template_score = if template_hit { self.template_bonus } else { 0 };

        keyword_score + template_score
    }

    /// Score a canonical message and report which rules fired.
    pub fn explain(&self, text: &CanonicalText) -> RuleReport {
        let text = text.as_str();

        let keyword_matches: Vec<String> = self
            .keywords
            .iter()
            .filter(|pattern| pattern.is_match(text))
            .map(|pattern| pattern.as_str().to_string())
            .collect();

        let best_template = similarity::best_match(text, self.templates.as_slice(), 0.0).map(
            |(idx, ratio)| TemplateMatch {
                template: self.templates[idx].clone(),
                ratio,
            },
        );
        let template_hit = best_template
            .as_ref()
            .is_some_and(|m| m.ratio >= self.template_cutoff);

        let mut score = keyword_matches.len() as u32 * self.keyword_weight;
        if template_hit {
            score += self.template_bonus;
        }

        log::debug!(
            "rule score {score}: keywords {keyword_matches:?}, template hit {template_hit}"
        );

        RuleReport {
            score,
            keyword_matches,
            best_template,
            template_hit,
        }
    }
}
