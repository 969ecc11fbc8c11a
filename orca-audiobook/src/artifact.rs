//! Storage for per-unit audio artifacts.
//!
//! The orchestrator and the assembler only talk through this store. An
//! artifact that exists is treated as finished, which is what makes an
//! interrupted run resumable.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Indexed artifact storage.
pub trait ArtifactStore {
    /// Whether an artifact for `index` is present.
    fn exists(&self, index: usize) -> bool;

    /// Store the artifact for `index`, replacing any previous one.
    fn write(&self, index: usize, bytes: &[u8]) -> io::Result<()>;

    /// Read the artifact for `index`.
    fn read(&self, index: usize) -> io::Result<Vec<u8>>;

    /// Remove the artifact for `index`.
    fn delete(&self, index: usize) -> io::Result<()>;

    /// Where the artifact for `index` lives, for log messages.
    fn location(&self, index: usize) -> PathBuf;
}

/// Artifacts as `<dir>/<base>_chunk_<index>.wav` files.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    dir: PathBuf,
    base_name: String,
}

impl LocalArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_name: base_name.into(),
        }
    }

    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_chunk_{}.wav", self.base_name, index))
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn exists(&self, index: usize) -> bool {
        self.artifact_path(index).is_file()
    }

    fn write(&self, index: usize, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Write beside the target and rename, so an interrupted write never
        // leaves a partial file that a later run would take as finished.
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        file.persist(self.artifact_path(index)).map_err(|e| e.error)?;
        Ok(())
    }

    fn read(&self, index: usize) -> io::Result<Vec<u8>> {
        fs::read(self.artifact_path(index))
    }

    fn delete(&self, index: usize) -> io::Result<()> {
        fs::remove_file(self.artifact_path(index))
    }

    fn location(&self, index: usize) -> PathBuf {
        self.artifact_path(index)
    }
}
