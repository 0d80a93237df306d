//! End-to-end scenarios: dataset, training, storage, selection, inference.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use spamcheck::config::SpamCheckConfig;
use spamcheck::dataset::{CsvDatasetLoader, SplitVariant};
use spamcheck::decision::{DecisionFuser, Thresholds};
use spamcheck::error::Result;
use spamcheck::ml::{ClassificationReport, ModelFamily, SpamClassifier, TextClassifier};
use spamcheck::normalize::{Normalizer, NormalizerKind};
use spamcheck::rules::{RuleConfig, RuleEngine};
use spamcheck::selection::{EvaluationRecord, SelectionFilter, activate, select_best};
use spamcheck::storage::{Artifact, ArtifactKind, ArtifactMeta, FileStore};
use tempfile::TempDir;

const SPAM: &[&str] = &[
    "Subscribe to my channel for free gifts {i}",
    "Check out my channel http://spam{i}.example click here",
    "Win cash prize number {i} now",
    "Free followers, visit my profile {i}",
];

const HAM: &[&str] = &[
    "This song is great, listened {i} times already",
    "The guitar solo in this video gives me chills",
    "My dad played this record for me when I was {i}",
    "Beautiful voice and lovely lyrics, thanks for sharing",
];

fn write_dataset(dir: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(dir.join("Youtube01.csv"))?;
    writer.write_record(["COMMENT_ID", "AUTHOR", "CONTENT", "CLASS"])?;

    for i in 0..20 {
        let spam = SPAM[i % SPAM.len()].replace("{i}", &i.to_string());
        let ham = HAM[i % HAM.len()].replace("{i}", &i.to_string());
        writer.write_record([format!("s{i}"), "someone".to_string(), spam, "1".to_string()])?;
        writer.write_record([format!("h{i}"), "someone".to_string(), ham, "0".to_string()])?;
    }
    writer.write_record(["bad", "someone", "label is not a class", "maybe"])?;
    writer.flush()?;
    Ok(())
}

/// Train every family on `variant` the way the `train` command does.
fn train_all(
    data_dir: &Path,
    store: &FileStore,
    variant: SplitVariant,
    kind: NormalizerKind,
) -> Result<Vec<EvaluationRecord>> {
    let config = SpamCheckConfig::default();
    let examples = CsvDatasetLoader::new().load_dir(data_dir)?;
    let split = variant.split(&examples, config.training.test_size, config.training.seed)?;

    let normalizer = Normalizer::new(kind)?;
    let train_texts = normalizer.normalize_all(split.train_texts().as_slice())?;
    let test_texts = normalizer.normalize_all(split.test_texts().as_slice())?;

    let mut records = Vec::new();
    for family in ModelFamily::ALL {
        let classifier =
            TextClassifier::fit(family, &train_texts, &split.train_labels(), &config.training)?;
        let probabilities = classifier.predict_all(&test_texts)?;
        let report = ClassificationReport::from_probabilities(&split.test_labels(), &probabilities)?;

        let meta = ArtifactMeta::new(family, variant, kind, train_texts.len());
        store.save_artifact(&Artifact::new(meta, classifier)?)?;
        records.push(EvaluationRecord::new(family.as_str(), variant.as_str(), report.f1()));
    }

    store.write_metrics(variant.as_str(), &records)?;
    Ok(records)
}

#[test]
fn test_dataset_loading_skips_bad_rows() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path())?;

    let examples = CsvDatasetLoader::new().load_dir(temp_dir.path())?;
    assert_eq!(examples.len(), 40);
    assert_eq!(examples.iter().filter(|e| e.is_spam()).count(), 20);

    Ok(())
}

#[test]
fn test_train_select_and_predict() -> Result<()> {
    let data_dir = TempDir::new().unwrap();
    let artifacts_dir = TempDir::new().unwrap();
    write_dataset(data_dir.path())?;
    let store = FileStore::create(artifacts_dir.path())?;

    let records = train_all(data_dir.path(), &store, SplitVariant::Basic, NormalizerKind::Basic)?;
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| (0.0..=1.0).contains(&r.f1)));

    assert!(store.file_exists("basic_logreg.bin"));
    assert!(store.file_exists("basic_svm.bin"));
    assert!(store.dir_exists("basic_centroid"));

    let stored = store.read_metrics()?;
    assert_eq!(stored.len(), records.len());
    for (read, written) in stored.iter().zip(&records) {
        assert_eq!((&read.model, &read.variant), (&written.model, &written.variant));
        assert!((read.f1 - written.f1).abs() < 1e-12);
    }

    let chosen = select_best(&stored, None)?;
    activate(&store, chosen)?;

    let artifact = store.load_active()?;
    assert_eq!(artifact.meta.family.as_str(), chosen.model);
    assert_eq!(artifact.meta.variant, SplitVariant::Basic);

    let rules = Arc::new(RuleEngine::new(&RuleConfig::default())?);
    let fuser = DecisionFuser::from_artifact(artifact, rules, Thresholds::default())?;

    let verdict = fuser.decide("Subscribe to my channel for FREE, click here!")?;
    assert!(verdict.rule_score() >= 2);
    assert!(verdict.is_spam());
    assert!((0.0..=1.0).contains(&verdict.probability()));

    Ok(())
}

#[test]
fn test_manual_override_activates_directory_artifact() -> Result<()> {
    let data_dir = TempDir::new().unwrap();
    let artifacts_dir = TempDir::new().unwrap();
    write_dataset(data_dir.path())?;
    let store = FileStore::create(artifacts_dir.path())?;

    train_all(data_dir.path(), &store, SplitVariant::Basic, NormalizerKind::Basic)?;
    let records = store.read_metrics()?;

    let filter = SelectionFilter::model("centroid");
    let chosen = select_best(&records, Some(&filter))?;
    let pointer = activate(&store, chosen)?;
    assert_eq!(pointer.kind, ArtifactKind::Directory);

    let artifact = store.load_active()?;
    assert_eq!(artifact.meta.family, ModelFamily::Centroid);
    assert_eq!(artifact.kind(), ArtifactKind::Directory);

    Ok(())
}

#[test]
fn test_stored_artifacts_predict_like_the_originals() -> Result<()> {
    let data_dir = TempDir::new().unwrap();
    let artifacts_dir = TempDir::new().unwrap();
    write_dataset(data_dir.path())?;
    let store = FileStore::create(artifacts_dir.path())?;

    let config = SpamCheckConfig::default();
    let examples = CsvDatasetLoader::new().load_dir(data_dir.path())?;
    let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
    let labels: Vec<u8> = examples.iter().map(|e| e.label).collect();

    let normalizer = Normalizer::basic()?;
    let canonical = normalizer.normalize_all(texts.as_slice())?;
    let sample = normalizer.normalize("free gifts on my channel, click here")?;

    for family in ModelFamily::ALL {
        let classifier = TextClassifier::fit(family, &canonical, &labels, &config.training)?;
        let before = classifier.predict_probability(&sample)?;

        let meta = ArtifactMeta::new(family, SplitVariant::Basic, NormalizerKind::Basic, texts.len());
        let name = store.save_artifact(&Artifact::new(meta, classifier)?)?;
        let loaded = store.load_artifact(&name)?;

        let after = loaded.classifier.predict_probability(&sample)?;
        assert!((before - after).abs() < 1e-9, "{family}: {before} vs {after}");
        assert_eq!(loaded.meta.training_examples, texts.len());
    }

    Ok(())
}

#[test]
fn test_inference_uses_the_training_normalizer() -> Result<()> {
    let data_dir = TempDir::new().unwrap();
    let artifacts_dir = TempDir::new().unwrap();
    write_dataset(data_dir.path())?;
    let store = FileStore::create(artifacts_dir.path())?;

    train_all(data_dir.path(), &store, SplitVariant::Basic, NormalizerKind::Extended)?;
    let records = store.read_metrics()?;
    let chosen = select_best(&records, Some(&SelectionFilter::model("logreg")))?;
    activate(&store, chosen)?;

    let artifact = store.load_active()?;
    assert_eq!(artifact.meta.normalizer, NormalizerKind::Extended);

    let rules = Arc::new(RuleEngine::new(&RuleConfig::default())?);
    let fuser = DecisionFuser::from_artifact(artifact, rules, Thresholds::default())?;
    assert_eq!(fuser.normalizer().kind(), NormalizerKind::Extended);

    let verdict = fuser.decide("Click here!")?;
    assert!(verdict.rule_score() >= 2);
    assert!(verdict.is_spam());

    Ok(())
}

#[test]
fn test_metrics_file_is_rewritten_per_variant() -> Result<()> {
    let data_dir = TempDir::new().unwrap();
    let artifacts_dir = TempDir::new().unwrap();
    write_dataset(data_dir.path())?;
    let store = FileStore::create(artifacts_dir.path())?;

    train_all(data_dir.path(), &store, SplitVariant::Basic, NormalizerKind::Basic)?;
    train_all(data_dir.path(), &store, SplitVariant::Basic, NormalizerKind::Basic)?;

    let content = fs::read_to_string(artifacts_dir.path().join("basic_metrics.json"))?;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&content)?;
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.get("model").is_some() && e.get("f1").is_some()));

    Ok(())
}
