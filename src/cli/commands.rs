//! Command implementations for the spamcheck CLI.

use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::SpamCheckConfig;
use crate::dataset::CsvDatasetLoader;
use crate::decision::{DecisionFuser, Thresholds};
use crate::error::Result;
use crate::ml::{ClassificationReport, ModelFamily, TextClassifier};
use crate::normalize::Normalizer;
use crate::rules::{RuleEngine, RuleReport};
use crate::selection::{EvaluationRecord, SelectionFilter, activate, select_best};
use crate::storage::{Artifact, ArtifactMeta, FileStore};

/// Execute a CLI command.
pub fn execute_command(args: SpamCheckArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    match &args.command {
        Command::Train(train_args) => train(train_args, &config, &args),
        Command::Evaluate(evaluate_args) => evaluate(evaluate_args, &config, &args),
        Command::Predict(predict_args) => predict(predict_args, &config, &args),
        Command::Normalize(normalize_args) => normalize(normalize_args, &config, &args),
        Command::Rules(rules_args) => explain_rules(rules_args, &config, &args),
    }
}

/// Load the configuration file, if any, and apply command line overrides.
pub fn resolve_config(args: &SpamCheckArgs) -> Result<SpamCheckConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::debug!("loading configuration from {}", path.display());
            SpamCheckConfig::load(path)?
        }
        None => SpamCheckConfig::default(),
    };

    if let Some(dir) = &args.artifacts_dir {
        config.artifacts_dir = dir.clone();
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if args.rule_threshold.is_some() || args.probability_threshold.is_some() {
        config.thresholds = Thresholds::new(
            args.rule_threshold.unwrap_or(config.thresholds.rule),
            args.probability_threshold
                .unwrap_or(config.thresholds.probability),
        )?;
    }

    Ok(config)
}

/// Train every model family on one variant, save the artifacts and the
/// variant's metrics file.
fn train(args: &TrainArgs, config: &SpamCheckConfig, cli_args: &SpamCheckArgs) -> Result<()> {
    let start_time = Instant::now();
    let normalizer_kind = args.normalizer.unwrap_or(config.normalizer);
    let variant = args.variant;

    let examples = CsvDatasetLoader::new().load_dir(&config.data_dir)?;
    let split = variant.split(&examples, config.training.test_size, config.training.seed)?;

    let normalizer = Normalizer::new(normalizer_kind)?;
    let train_texts = normalizer.normalize_all(split.train_texts().as_slice())?;
    let train_labels = split.train_labels();
    let test_texts = normalizer.normalize_all(split.test_texts().as_slice())?;
    let test_labels = split.test_labels();

    log::info!(
        "training on variant {variant} with {} train / {} test examples ({normalizer_kind} normalizer)",
        train_texts.len(),
        test_texts.len()
    );

    let store = FileStore::create(&config.artifacts_dir)?;
    let mut records = Vec::with_capacity(ModelFamily::ALL.len());
    let mut models = Vec::with_capacity(ModelFamily::ALL.len());

    for family in ModelFamily::ALL {
        let classifier = TextClassifier::fit(family, &train_texts, &train_labels, &config.training)?;

        let probabilities = classifier.predict_all(&test_texts)?;
        let report = ClassificationReport::from_probabilities(&test_labels, &probabilities)?;
        let f1 = report.f1();
        log::info!("{family} on {variant}: f1 {f1:.4}");

        let meta = ArtifactMeta::new(family, variant, normalizer_kind, train_texts.len());
        let artifact = Artifact::new(meta, classifier)?;
        let name = store.save_artifact(&artifact)?;

        records.push(EvaluationRecord::new(family.as_str(), variant.as_str(), f1));
        models.push(ModelTrainingResult {
            model: family.to_string(),
            f1,
            artifact: name,
            report,
        });
    }

    let metrics_file = store.write_metrics(variant.as_str(), &records)?;

    output_result(
        "Training finished",
        &TrainingResult {
            variant: variant.to_string(),
            normalizer: normalizer_kind.to_string(),
            train_examples: train_texts.len(),
            test_examples: test_texts.len(),
            metrics_file,
            models,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}

/// Pick a model from the stored metrics and repoint the active model.
fn evaluate(
    args: &EvaluateArgs,
    config: &SpamCheckConfig,
    cli_args: &SpamCheckArgs,
) -> Result<()> {
    let store = FileStore::open(&config.artifacts_dir)?;
    let records = store.read_metrics()?;

    let filter = args.has_filter().then(|| {
        SelectionFilter::new(
            args.model.map(|m| m.as_str().to_string()),
            args.variant.map(|v| v.as_str().to_string()),
        )
    });

    let chosen = select_best(&records, filter.as_ref())?;
    let pointer = activate(&store, chosen)?;

    output_result(
        "Active model updated",
        &SelectionResult {
            model: pointer.model.clone(),
            variant: pointer.variant.clone(),
            f1: chosen.f1,
            path: pointer.path.clone(),
            kind: pointer.kind.to_string(),
            candidates: records.len(),
        },
        cli_args,
    )
}

/// Classify one message with the active model.
fn predict(args: &PredictArgs, config: &SpamCheckConfig, cli_args: &SpamCheckArgs) -> Result<()> {
    let store = FileStore::open(&config.artifacts_dir)?;
    let artifact = store.load_active()?;
    log::debug!(
        "active model {} trained on {} ({} normalizer)",
        artifact.meta.family,
        artifact.meta.variant,
        artifact.meta.normalizer
    );

    let rules = Arc::new(RuleEngine::new(&config.rules)?);
    let fuser = DecisionFuser::from_artifact(artifact, rules, config.thresholds)?;

    let verdict = if args.stdin {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        fuser.decide_bytes(&bytes)?
    } else {
        fuser.decide(args.text.as_deref().unwrap_or_default())?
    };

    output_result("Verdict", &verdict, cli_args)
}

/// Print the canonical form of a message.
fn normalize(
    args: &NormalizeArgs,
    config: &SpamCheckConfig,
    cli_args: &SpamCheckArgs,
) -> Result<()> {
    let normalizer = Normalizer::new(args.normalizer.unwrap_or(config.normalizer))?;
    let canonical = normalizer.normalize(&args.text)?;

    output_result(
        "Canonical text",
        &NormalizationResult {
            normalizer: normalizer.kind().to_string(),
            canonical: canonical.into_string(),
        },
        cli_args,
    )
}

/// Print how the rule engine scores a message.
fn explain_rules(
    args: &RulesArgs,
    config: &SpamCheckConfig,
    cli_args: &SpamCheckArgs,
) -> Result<()> {
    output_result("Rule report", &rule_report(&args.text, config)?, cli_args)
}

/// Rules always score the basic canonical form.
fn rule_report(text: &str, config: &SpamCheckConfig) -> Result<RuleReport> {
    let engine = RuleEngine::new(&config.rules)?;
    let canonical = Normalizer::basic()?.normalize(text)?;
    Ok(engine.explain(&canonical))
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_config_overrides() {
        let args = SpamCheckArgs::try_parse_from([
            "spamcheck",
            "--artifacts-dir",
            "/tmp/models",
            "--rule-threshold",
            "4",
            "rules",
            "hello",
        ])
        .unwrap();

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.artifacts_dir, std::path::PathBuf::from("/tmp/models"));
        assert_eq!(config.thresholds.rule, 4);
        assert_eq!(config.thresholds.probability, 0.80);
    }

    #[test]
    fn test_resolve_config_rejects_bad_probability() {
        let args = SpamCheckArgs::try_parse_from([
            "spamcheck",
            "--probability-threshold",
            "1.5",
            "rules",
            "hello",
        ])
        .unwrap();

        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_resolve_config_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("spamcheck.json");
        std::fs::write(&path, r#"{"thresholds": {"rule": 5}, "normalizer": "extended"}"#).unwrap();

        let args = SpamCheckArgs::try_parse_from([
            "spamcheck",
            "--config",
            path.to_str().unwrap(),
            "--probability-threshold",
            "0.5",
            "rules",
            "hello",
        ])
        .unwrap();

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.thresholds.rule, 5);
        assert_eq!(config.thresholds.probability, 0.5);
        assert_eq!(config.normalizer, crate::normalize::NormalizerKind::Extended);
    }

    #[test]
    fn test_evaluate_without_metrics() {
        let temp_dir = TempDir::new().unwrap();
        let artifacts = temp_dir.path().to_str().unwrap();

        let args =
            SpamCheckArgs::try_parse_from(["spamcheck", "--artifacts-dir", artifacts, "evaluate"])
                .unwrap();

        let err = execute_command(args).unwrap_err();
        assert!(matches!(err, crate::error::SpamCheckError::NotFound(_)));
    }

    #[test]
    fn test_rule_report_ignores_configured_normalizer() -> Result<()> {
        let config = SpamCheckConfig::from_json(r#"{"normalizer": "extended"}"#)?;

        let report = rule_report("Click here!", &config)?;

        assert!(report.template_hit);
        assert_eq!(report.score, 3);
        Ok(())
    }
}
