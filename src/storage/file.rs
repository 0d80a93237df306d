//! Directory-backed store for trained artifacts, metrics and the active
//! model pointer.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpamCheckError};

/// A store rooted at one directory.
///
/// Every write that readers may observe concurrently goes through
/// [`FileStore::write_atomic`]: the bytes land in a temporary sibling
/// first and are then renamed over the destination.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// The root directory for storage.
    directory: PathBuf,
}

impl FileStore {
    /// Open a store, creating the directory if needed.
    pub fn create<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            fs::create_dir_all(&directory)?;
        }

        if !directory.is_dir() {
            return Err(SpamCheckError::invalid_input(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStore { directory })
    }

    /// Open an existing store without creating anything.
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.is_dir() {
            return Err(SpamCheckError::not_found(format!(
                "artifact directory {} does not exist",
                directory.display()
            )));
        }
        Ok(FileStore { directory })
    }

    /// The root directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Full path of an entry.
    pub fn path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    /// Whether an entry exists as a regular file.
    pub fn file_exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Whether an entry exists as a directory.
    pub fn dir_exists(&self, name: &str) -> bool {
        self.path(name).is_dir()
    }

    /// Read a whole file.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        fs::read(self.path(name)).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SpamCheckError::not_found(format!("{} does not exist", self.path(name).display()))
            } else {
                e.into()
            }
        })
    }

    /// Entries whose names end with `suffix`, sorted by name.
    pub fn list_with_suffix(&self, suffix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(suffix) && entry.path().is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// A name in the store that no entry uses yet.
    fn temp_name(&self, prefix: &str) -> Result<String> {
        for counter in 0..10_000 {
            let name = format!(".{prefix}_{}_{counter}.tmp", std::process::id());
            if !self.path(&name).exists() {
                return Ok(name);
            }
        }
        Err(SpamCheckError::other("Could not create temporary file"))
    }

    /// Replace `name` with `bytes` so that readers see either the old or the
    /// new content, never a partial write.
    pub fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let temp = self.temp_name(name)?;
        let temp_path = self.path(&temp);

        let result = (|| -> Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&temp_path, self.path(name))?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    /// Replace the directory `name` with one populated by `fill`.
    ///
    /// The new tree is built under a temporary name. The previous tree is
    /// renamed aside before the new one is moved in, and is only deleted
    /// once the swap succeeded, so `name` is never left empty by a failure.
    pub fn write_dir_atomic<F>(&self, name: &str, fill: F) -> Result<()>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let temp = self.temp_name(name)?;
        let temp_path = self.path(&temp);
        fs::create_dir(&temp_path)?;

        if let Err(e) = fill(&temp_path) {
            let _ = fs::remove_dir_all(&temp_path);
            return Err(e);
        }

        let target = self.path(name);
        let previous = if target.exists() {
            let aside = self.path(&self.temp_name(&format!("{name}_old"))?);
            if let Err(e) = fs::rename(&target, &aside) {
                let _ = fs::remove_dir_all(&temp_path);
                return Err(e.into());
            }
            Some(aside)
        } else {
            None
        };

        if let Err(e) = fs::rename(&temp_path, &target) {
            if let Some(aside) = &previous {
                if let Err(restore) = fs::rename(aside, &target) {
                    log::warn!(
                        "could not restore {} from {}: {restore}",
                        target.display(),
                        aside.display()
                    );
                }
            }
            let _ = fs::remove_dir_all(&temp_path);
            return Err(e.into());
        }

        if let Some(aside) = previous {
            let removed = if aside.is_dir() {
                fs::remove_dir_all(&aside)
            } else {
                fs::remove_file(&aside)
            };
            if let Err(e) = removed {
                log::warn!("could not remove replaced {}: {e}", aside.display());
            }
        }
        Ok(())
    }
}
