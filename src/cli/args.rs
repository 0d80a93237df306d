//! Command line argument parsing for the spamcheck CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::dataset::SplitVariant;
use crate::ml::ModelFamily;
use crate::normalize::NormalizerKind;

/// spamcheck - comment spam detection with rules and trained classifiers
#[derive(Parser, Debug, Clone)]
#[command(name = "spamcheck")]
#[command(about = "Detect comment spam by fusing keyword rules with a trained classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SpamCheckArgs {
    /// Verbosity level (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding artifacts, metrics files and the active pointer
    #[arg(long, env = "SPAMCHECK_ARTIFACTS", value_name = "DIR", global = true)]
    pub artifacts_dir: Option<PathBuf>,

    /// Directory holding the training CSV files
    #[arg(long, env = "SPAMCHECK_DATA", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Rule score at or above which a message is spam
    #[arg(long, value_name = "SCORE", global = true)]
    pub rule_threshold: Option<u32>,

    /// Classifier probability at or above which a message is spam
    #[arg(long, value_name = "PROBABILITY", global = true)]
    pub probability_threshold: Option<f64>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SpamCheckArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train every model family on one data-split variant
    Train(TrainArgs),

    /// Select the best trained model and make it active
    Evaluate(EvaluateArgs),

    /// Classify a message with the active model
    Predict(PredictArgs),

    /// Show the canonical form of a message
    Normalize(NormalizeArgs),

    /// Show how the rule engine scores a message
    Rules(RulesArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Data-split variant to train on
    #[arg(long, default_value = "basic", value_parser = parse_variant)]
    pub variant: SplitVariant,

    /// Canonicalization pipeline (defaults to the configured one)
    #[arg(long, value_parser = parse_normalizer)]
    pub normalizer: Option<NormalizerKind>,
}

/// Arguments for model selection
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Restrict selection to one model family
    #[arg(long, value_parser = parse_model)]
    pub model: Option<ModelFamily>,

    /// Restrict selection to one data-split variant
    #[arg(long, value_parser = parse_variant)]
    pub variant: Option<SplitVariant>,
}

impl EvaluateArgs {
    /// Whether any manual override was given.
    pub fn has_filter(&self) -> bool {
        self.model.is_some() || self.variant.is_some()
    }
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Message to classify
    #[arg(value_name = "TEXT", required_unless_present = "stdin")]
    pub text: Option<String>,

    /// Read the message from standard input instead
    #[arg(long, conflicts_with = "text")]
    pub stdin: bool,
}

/// Arguments for normalization
#[derive(Parser, Debug, Clone)]
pub struct NormalizeArgs {
    /// Message to normalize
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Canonicalization pipeline (defaults to the configured one)
    #[arg(long, value_parser = parse_normalizer)]
    pub normalizer: Option<NormalizerKind>,
}

/// Arguments for rule inspection
#[derive(Parser, Debug, Clone)]
pub struct RulesArgs {
    /// Message to score
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn parse_variant(s: &str) -> std::result::Result<SplitVariant, String> {
    s.parse().map_err(|e: crate::error::SpamCheckError| e.to_string())
}

fn parse_model(s: &str) -> std::result::Result<ModelFamily, String> {
    s.parse().map_err(|e: crate::error::SpamCheckError| e.to_string())
}

fn parse_normalizer(s: &str) -> std::result::Result<NormalizerKind, String> {
    s.parse().map_err(|e: crate::error::SpamCheckError| e.to_string())
}
