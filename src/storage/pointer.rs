//! The active model pointer.
//!
//! `active.json` names the one artifact used for live decisions. It is
//! replaced with a write-to-temp-then-rename, so a concurrent reader sees
//! either the previous pointer or the new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::storage::artifact::{Artifact, ArtifactKind};
use crate::storage::file::FileStore;

/// File name of the pointer inside the artifact directory.
pub const POINTER_FILE: &str = "active.json";

/// Reference to the artifact currently used for inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveModelPointer {
    pub model: String,
    pub variant: String,
    pub kind: ArtifactKind,
    /// Entry name relative to the artifact directory.
    pub path: String,
    pub activated_at: DateTime<Utc>,
}

impl ActiveModelPointer {
    pub fn new<M: Into<String>, V: Into<String>>(
        model: M,
        variant: V,
        kind: ArtifactKind,
        path: String,
    ) -> Self {
        ActiveModelPointer {
            model: model.into(),
            variant: variant.into(),
            kind,
            path,
            activated_at: Utc::now(),
        }
    }
}

impl FileStore {
    /// Atomically replace the active pointer.
    pub fn write_pointer(&self, pointer: &ActiveModelPointer) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(pointer)?;
        self.write_atomic(POINTER_FILE, &bytes)?;
        log::info!(
            "active model is now {} ({}, {})",
            pointer.path,
            pointer.model,
            pointer.variant
        );
        Ok(())
    }

    /// Read the active pointer.
    pub fn read_pointer(&self) -> Result<ActiveModelPointer> {
        if !self.file_exists(POINTER_FILE) {
            return Err(SpamCheckError::not_found(format!(
                "no active model in {}; run 'evaluate' first",
                self.directory().display()
            )));
        }
        let bytes = self.read(POINTER_FILE)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| SpamCheckError::model(format!("corrupt active model pointer: {e}")))
    }

    /// Load the artifact the pointer refers to.
    pub fn load_active(&self) -> Result<Artifact> {
        let pointer = self.read_pointer()?;

        match self.kind_of(&pointer.path) {
            Some(kind) if kind != pointer.kind => log::warn!(
                "active pointer records a {} artifact but {} is a {kind}",
                pointer.kind,
                pointer.path
            ),
            Some(_) => {}
            None => {
                return Err(SpamCheckError::model(format!(
                    "active model {} is missing from {}",
                    pointer.path,
                    self.directory().display()
                )));
            }
        }

        let artifact = self.load_artifact(&pointer.path)?;
        log::debug!(
            "loaded active {} model trained on {}",
            artifact.meta.family,
            artifact.meta.variant
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn test_missing_pointer_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::create(temp_dir.path()).unwrap();

        assert!(matches!(store.read_pointer(), Err(SpamCheckError::NotFound(_))));
        assert!(matches!(store.load_active(), Err(SpamCheckError::NotFound(_))));
    }

    #[test]
    fn test_pointer_replace() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::create(temp_dir.path()).unwrap();

        let first = ActiveModelPointer::new(
            "logreg",
            "basic",
            ArtifactKind::File,
            "basic_logreg.bin".into(),
        );
        store.write_pointer(&first).unwrap();
        assert_eq!(store.read_pointer().unwrap(), first);

        let second = ActiveModelPointer::new(
            "centroid",
            "80-20",
            ArtifactKind::Directory,
            "80-20_centroid".into(),
        );
        store.write_pointer(&second).unwrap();
        assert_eq!(store.read_pointer().unwrap(), second);
    }

    #[test]
    fn test_dangling_pointer_is_model_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::create(temp_dir.path()).unwrap();
        let pointer =
            ActiveModelPointer::new("svm", "basic", ArtifactKind::File, "basic_svm.bin".into());
        store.write_pointer(&pointer).unwrap();

        assert!(matches!(store.load_active(), Err(SpamCheckError::Model(_))));
    }

    #[test]
    fn test_pointer_json_shape() {
        let pointer =
            ActiveModelPointer::new("svm", "basic", ArtifactKind::File, "basic_svm.bin".into());
        let value = serde_json::to_value(&pointer).unwrap();
        assert_eq!(value["kind"], "file");
        assert_eq!(value["path"], "basic_svm.bin");
        assert!(value["activated_at"].is_string());
    }
}
