//! Trained classifier artifacts.
//!
//! Two storage shapes exist:
//!
//! - file: `{variant}_{model}.bin`, a bincode-encoded [`Artifact`];
//! - directory: `{variant}_{model}/` holding `meta.json`,
//!   `vectorizer.json` and `centroids.json`.
//!
//! Loading never trusts the family to pick the shape; it inspects the path.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::SplitVariant;
use crate::error::{Result, SpamCheckError};
use crate::ml::{ModelFamily, TextClassifier, TfIdfVectorizer, TrainedModel};
use crate::normalize::NormalizerKind;
use crate::storage::file::FileStore;

const FILE_EXTENSION: &str = "bin";
const META_FILE: &str = "meta.json";
const VECTORIZER_FILE: &str = "vectorizer.json";
const CENTROIDS_FILE: &str = "centroids.json";

/// How an artifact is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    File,
    Directory,
}

impl ArtifactKind {
    /// The shape a family is saved in.
    pub fn for_family(family: ModelFamily) -> Self {
        match family {
            ModelFamily::Logreg | ModelFamily::Svm => ArtifactKind::File,
            ModelFamily::Centroid => ArtifactKind::Directory,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::File => write!(f, "file"),
            ArtifactKind::Directory => write!(f, "directory"),
        }
    }
}

/// `{variant}_{model}`, the stem shared by both shapes.
pub fn artifact_stem(variant: &str, model: &str) -> String {
    format!("{variant}_{model}")
}

/// Entry name of an artifact of the given shape.
pub fn artifact_name(variant: &str, model: &str, kind: ArtifactKind) -> String {
    let stem = artifact_stem(variant, model);
    match kind {
        ArtifactKind::File => format!("{stem}.{FILE_EXTENSION}"),
        ArtifactKind::Directory => stem,
    }
}

/// Facts recorded next to every trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub family: ModelFamily,
    pub variant: SplitVariant,
    /// Pipeline the training texts went through. Inference must use the same.
    pub normalizer: NormalizerKind,
    pub training_examples: usize,
    pub trained_at: DateTime<Utc>,
    /// Crate version that wrote the artifact.
    pub version: String,
}

impl ArtifactMeta {
    pub fn new(
        family: ModelFamily,
        variant: SplitVariant,
        normalizer: NormalizerKind,
        training_examples: usize,
    ) -> Self {
        ArtifactMeta {
            family,
            variant,
            normalizer,
            training_examples,
            trained_at: Utc::now(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// A trained classifier with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub meta: ArtifactMeta,
    pub classifier: TextClassifier,
}

impl Artifact {
    pub fn new(meta: ArtifactMeta, classifier: TextClassifier) -> Result<Self> {
        if meta.family != classifier.family() {
            return Err(SpamCheckError::model(format!(
                "metadata says {} but the classifier is {}",
                meta.family,
                classifier.family()
            )));
        }
        Ok(Artifact { meta, classifier })
    }

    /// Entry name this artifact is saved under.
    pub fn name(&self) -> String {
        artifact_name(
            self.meta.variant.as_str(),
            self.meta.family.as_str(),
            self.kind(),
        )
    }

    /// Storage shape of this artifact.
    pub fn kind(&self) -> ArtifactKind {
        ArtifactKind::for_family(self.meta.family)
    }
}

impl FileStore {
    /// Save an artifact in the shape of its family and return its entry name.
    pub fn save_artifact(&self, artifact: &Artifact) -> Result<String> {
        let name = artifact.name();

        match artifact.kind() {
            ArtifactKind::File => {
                let bytes = bincode::serialize(artifact)?;
                self.write_atomic(&name, &bytes)?;
            }
            ArtifactKind::Directory => {
                let TrainedModel::Centroid(centroids) = artifact.classifier.model() else {
                    return Err(SpamCheckError::model(format!(
                        "{} models cannot be stored as directories",
                        artifact.meta.family
                    )));
                };
                self.write_dir_atomic(&name, |dir| {
                    fs::write(
                        dir.join(META_FILE),
                        serde_json::to_vec_pretty(&artifact.meta)?,
                    )?;
                    fs::write(
                        dir.join(VECTORIZER_FILE),
                        serde_json::to_vec(artifact.classifier.vectorizer())?,
                    )?;
                    fs::write(dir.join(CENTROIDS_FILE), serde_json::to_vec(centroids)?)?;
                    Ok(())
                })?;
            }
        }

        log::info!("saved {} artifact {name}", artifact.kind());
        Ok(name)
    }

    /// Find the artifact of `(variant, model)`, probing the file shape first.
    pub fn resolve_artifact(&self, variant: &str, model: &str) -> Result<(ArtifactKind, String)> {
        for kind in [ArtifactKind::File, ArtifactKind::Directory] {
            let name = artifact_name(variant, model, kind);
            if self.kind_of(&name) == Some(kind) {
                return Ok((kind, name));
            }
        }
        Err(SpamCheckError::model(format!(
            "Model files not found for '{}'",
            artifact_stem(variant, model)
        )))
    }

    /// The shape of the entry `name`, if it exists.
    pub fn kind_of(&self, name: &str) -> Option<ArtifactKind> {
        if self.file_exists(name) {
            Some(ArtifactKind::File)
        } else if self.dir_exists(name) {
            Some(ArtifactKind::Directory)
        } else {
            None
        }
    }

    /// Load the artifact stored under `name`, whatever its shape.
    pub fn load_artifact(&self, name: &str) -> Result<Artifact> {
        match self.kind_of(name) {
            Some(ArtifactKind::File) => {
                let bytes = self.read(name)?;
                bincode::deserialize(&bytes).map_err(|e| {
                    SpamCheckError::model(format!("corrupt artifact {name}: {e}"))
                })
            }
            Some(ArtifactKind::Directory) => load_directory_artifact(&self.path(name)),
            None => Err(SpamCheckError::model(format!(
                "artifact {} does not exist",
                self.path(name).display()
            ))),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)
        .map_err(|e| SpamCheckError::model(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| SpamCheckError::model(format!("corrupt {}: {e}", path.display())))
}

fn load_directory_artifact(dir: &Path) -> Result<Artifact> {
    let meta: ArtifactMeta = read_json(&dir.join(META_FILE))?;
    let vectorizer: TfIdfVectorizer = read_json(&dir.join(VECTORIZER_FILE))?;
    let centroids = read_json(&dir.join(CENTROIDS_FILE))?;

    let classifier = TextClassifier::from_parts(vectorizer, TrainedModel::Centroid(centroids));
    Artifact::new(meta, classifier)
}
