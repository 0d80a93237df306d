//! Persistence of trained artifacts and the active model pointer.

pub mod artifact;
pub mod file;
pub mod pointer;

pub use artifact::{Artifact, ArtifactKind, ArtifactMeta, artifact_name, artifact_stem};
pub use file::FileStore;
pub use pointer::{ActiveModelPointer, POINTER_FILE};
