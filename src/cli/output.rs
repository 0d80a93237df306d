//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, SpamCheckArgs};
use crate::decision::Verdict;
use crate::error::Result;
use crate::ml::ClassificationReport;
use crate::rules::RuleReport;

/// Evaluation of one freshly trained model.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelTrainingResult {
    pub model: String,
    pub f1: f64,
    pub artifact: String,
    pub report: ClassificationReport,
}

/// Result structure for the train command.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingResult {
    pub variant: String,
    pub normalizer: String,
    pub train_examples: usize,
    pub test_examples: usize,
    pub metrics_file: String,
    pub models: Vec<ModelTrainingResult>,
    pub duration_ms: u64,
}

/// Result structure for the evaluate command.
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectionResult {
    pub model: String,
    pub variant: String,
    pub f1: f64,
    pub path: String,
    pub kind: String,
    pub candidates: usize,
}

/// Result structure for the normalize command.
#[derive(Debug, Serialize, Deserialize)]
pub struct NormalizationResult {
    pub normalizer: String,
    pub canonical: String,
}

/// Values the CLI knows how to print for people.
pub trait HumanOutput: Serialize {
    /// Print `self` in human-readable form. Defaults to one `key: value`
    /// line per top-level field.
    fn print_human(&self) -> Result<()> {
        let value = serde_json::to_value(self)?;
        output_generic_human(&value);
        Ok(())
    }
}

impl HumanOutput for SelectionResult {}

impl HumanOutput for NormalizationResult {}

impl HumanOutput for Verdict {}

impl HumanOutput for TrainingResult {
    fn print_human(&self) -> Result<()> {
        println!("Variant: {}", self.variant);
        println!("Normalizer: {}", self.normalizer);
        println!(
            "Examples: {} train / {} test",
            self.train_examples, self.test_examples
        );

        for model in &self.models {
            println!();
            println!("Model: {} (f1 {:.4})", model.model, model.f1);
            println!("────────────────");
            println!("{}", model.report);
            println!("Saved: {}", model.artifact);
        }

        println!();
        println!("Metrics: {}", self.metrics_file);
        println!("Duration: {} ms", self.duration_ms);
        Ok(())
    }
}

impl HumanOutput for RuleReport {
    fn print_human(&self) -> Result<()> {
        println!("score: {}", self.score);
        if self.keyword_matches.is_empty() {
            println!("keywords: none");
        } else {
            println!("keywords:");
            for pattern in &self.keyword_matches {
                println!("  {pattern}");
            }
        }
        match &self.best_template {
            Some(best) => println!(
                "best template: \"{}\" ({:.1}{})",
                best.template,
                best.ratio,
                if self.template_hit { ", hit" } else { "" }
            ),
            None => println!("best template: none"),
        }
        Ok(())
    }
}

/// Output a result in the format selected on the command line.
pub fn output_result<T: HumanOutput>(message: &str, result: &T, args: &SpamCheckArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: HumanOutput>(message: &str, result: &T, args: &SpamCheckArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }
    result.print_human()
}

/// Output generic data in human format.
fn output_generic_human(value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &SpamCheckArgs) -> Result<()> {
    println!("{}", render_json(result, args.pretty)?);
    Ok(())
}

fn render_json<T: Serialize>(result: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "none".to_string(),
    }
}
