//! Text analysis building blocks.
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Token Filter 1 → ... → Token Filter N
//! ```
//!
//! The normalizer assembles both of its pipelines from these pieces: the
//! basic variant only runs the char filters, the extended one runs
//! everything.

pub mod char_filter;
pub mod pipeline;
pub mod stemmer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use char_filter::{CharFilter, PatternReplaceCharFilter};
pub use pipeline::{Analyzer, PipelineAnalyzer};
pub use stemmer::{PorterStemmer, Stemmer};
pub use token::{Token, TokenStream};
pub use token_filter::{AlphabeticFilter, Filter, StemFilter, StopFilter};
pub use tokenizer::{RegexTokenizer, Tokenizer};
