//! Rule-based spam scoring.
//!
//! The [`RuleEngine`] adds a fixed weight for every keyword pattern present
//! in a canonical message and a fixed bonus when the message is close enough
//! to one of the known spam templates.

pub mod engine;
pub mod tables;

pub use engine::{RuleConfig, RuleEngine, RuleReport, TemplateMatch};
pub use tables::{DEFAULT_SPAM_KEYWORDS, DEFAULT_SPAM_TEMPLATES};
