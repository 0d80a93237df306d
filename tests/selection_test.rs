//! Integration tests for model selection and the active model pointer.

use std::fs;

use spamcheck::error::{Result, SpamCheckError};
use spamcheck::selection::{
    EvaluationRecord, SelectionFilter, activate, select_best, select_by_filter, select_by_metric,
};
use spamcheck::storage::{ArtifactKind, FileStore, POINTER_FILE};
use tempfile::TempDir;

fn two_variants() -> Vec<EvaluationRecord> {
    vec![
        EvaluationRecord::new("a", "v1", 0.9),
        EvaluationRecord::new("a", "v2", 0.95),
    ]
}

#[test]
fn test_best_record_without_filter() -> Result<()> {
    let records = two_variants();

    let chosen = select_by_metric(&records)?;
    assert_eq!(chosen.variant, "v2");
    assert_eq!(select_best(&records, None)?, chosen);

    Ok(())
}

#[test]
fn test_model_filter_spanning_variants_is_ambiguous() -> Result<()> {
    let records = two_variants();

    let err = select_by_filter(&records, &SelectionFilter::model("a")).unwrap_err();
    match err {
        SpamCheckError::AmbiguousSelection { model, variants } => {
            assert_eq!(model, "a");
            assert_eq!(variants, vec!["v1".to_string(), "v2".to_string()]);
        }
        other => panic!("expected ambiguity, got {other}"),
    }

    let chosen = select_by_filter(&records, &SelectionFilter::model("a").with_variant("v1"))?;
    assert_eq!(chosen.f1, 0.9);

    Ok(())
}

#[test]
fn test_empty_records_not_found() -> Result<()> {
    let err = select_best(&[], None).unwrap_err();
    assert!(matches!(err, SpamCheckError::NotFound(_)));

    let err = select_best(&two_variants(), Some(&SelectionFilter::model("b"))).unwrap_err();
    assert!(matches!(err, SpamCheckError::NotFound(_)));

    Ok(())
}

#[test]
fn test_metrics_files_round_trip_through_selection() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::create(temp_dir.path())?;

    store.write_metrics(
        "basic",
        &[
            EvaluationRecord::new("logreg", "basic", 0.91),
            EvaluationRecord::new("svm", "basic", 0.93),
        ],
    )?;
    store.write_metrics(
        "80-20",
        &[
            EvaluationRecord::new("logreg", "80-20", 0.93),
            EvaluationRecord::new("centroid", "80-20", 0.88),
        ],
    )?;

    let records = store.read_metrics()?;
    assert_eq!(records.len(), 4);

    // 0.93 tie resolves to the smaller (model, variant) pair
    let chosen = select_best(&records, None)?;
    assert_eq!((chosen.model.as_str(), chosen.variant.as_str()), ("logreg", "80-20"));

    let err = select_best(&records, Some(&SelectionFilter::model("logreg"))).unwrap_err();
    assert!(matches!(err, SpamCheckError::AmbiguousSelection { .. }));

    Ok(())
}

#[test]
fn test_activation_replaces_pointer_atomically() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::create(temp_dir.path())?;

    fs::write(temp_dir.path().join("basic_svm.bin"), b"svm")?;
    fs::create_dir(temp_dir.path().join("80-20_centroid"))?;

    let first = activate(&store, &EvaluationRecord::new("svm", "basic", 0.9))?;
    assert_eq!(first.kind, ArtifactKind::File);
    assert_eq!(store.read_pointer()?.path, "basic_svm.bin");

    let second = activate(&store, &EvaluationRecord::new("centroid", "80-20", 0.8))?;
    assert_eq!(second.kind, ArtifactKind::Directory);

    let current = store.read_pointer()?;
    assert_eq!(current.model, "centroid");
    assert_eq!(current.variant, "80-20");
    assert_eq!(current.path, "80-20_centroid");

    // only the pointer itself, no leftover temp files
    let pointers: Vec<String> = fs::read_dir(temp_dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".json") || name.ends_with(".tmp"))
        .collect();
    assert_eq!(pointers, vec![POINTER_FILE.to_string()]);

    Ok(())
}

#[test]
fn test_activation_requires_artifact() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::create(temp_dir.path())?;

    let err = activate(&store, &EvaluationRecord::new("logreg", "basic", 0.9)).unwrap_err();
    assert!(matches!(err, SpamCheckError::Model(_)));

    let err = store.read_pointer().unwrap_err();
    assert!(matches!(err, SpamCheckError::NotFound(_)));

    Ok(())
}
