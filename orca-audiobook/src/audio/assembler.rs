//! Audiobook assembly from indexed artifacts.

use super::buffer::AudioBuffer;
use super::encoder::AudioEncoder;
use crate::artifact::ArtifactStore;
use crate::error::{AudiobookError, Result};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::PathBuf;

/// Silence inserted after every chapter marker.
pub const MARKER_SILENCE_MS: u64 = 2000;

/// Merges artifacts `1..=max_index` into one exported file.
pub struct AudiobookAssembler<'a, S: ArtifactStore + ?Sized, E: AudioEncoder + ?Sized> {
    store: &'a S,
    encoder: &'a E,
    output_dir: PathBuf,
    base_name: String,
}

impl<'a, S: ArtifactStore + ?Sized, E: AudioEncoder + ?Sized> AudiobookAssembler<'a, S, E> {
    pub fn new(
        store: &'a S,
        encoder: &'a E,
        output_dir: impl Into<PathBuf>,
        base_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            encoder,
            output_dir: output_dir.into(),
            base_name: base_name.into(),
        }
    }

    /// Path of the exported audiobook.
    pub fn output_path(&self) -> PathBuf {
        let file_name = format!("{}.{}", self.base_name, self.encoder.extension());
        self.output_dir.join(file_name)
    }

    /// Merge and export the audiobook, then delete artifacts `1..=max_index`.
    ///
    /// Missing or unreadable artifacts are logged and skipped. Deletion
    /// happens on every exit path, including a failed export.
    pub fn assemble(&self, max_index: usize, marker_indices: &[usize]) -> Result<PathBuf> {
        let _cleanup = CleanupGuard {
            store: self.store,
            max_index,
        };

        let output_path = self.output_path();
        let merged = self.merge(max_index, marker_indices)?;

        info!(
            "Exporting {:.1} minutes of audio to {}",
            merged.duration_ms() as f64 / 60_000.0,
            output_path.display()
        );

        self.encoder
            .encode(&merged, &output_path)
            .map_err(|e| AudiobookError::Export {
                path: output_path.clone(),
                message: format!("{:#}", e),
            })?;

        Ok(output_path)
    }

    /// Concatenate artifacts in index order with silence after each marker.
    pub fn merge(&self, max_index: usize, marker_indices: &[usize]) -> Result<AudioBuffer> {
        let markers: HashSet<usize> = marker_indices.iter().copied().collect();
        let mut merged: Option<AudioBuffer> = None;

        for index in 1..=max_index {
            match self.load(index) {
                Ok(unit) => match merged.as_mut() {
                    None => merged = Some(unit),
                    Some(buffer) => {
                        if let Err(e) = buffer.append(&unit) {
                            warn!("{}", self.load_error(index, e.to_string()));
                        }
                    }
                },
                Err(e) => warn!("Skipping unit: {}", e),
            }

            if markers.contains(&index) {
                if let Some(buffer) = merged.as_mut() {
                    debug!("Chapter boundary after unit {}", index);
                    buffer.append_silence(MARKER_SILENCE_MS);
                }
            }
        }

        merged.ok_or_else(|| AudiobookError::Export {
            path: self.output_path(),
            message: format!("no audio artifacts found for units 1..={}", max_index),
        })
    }

    fn load(&self, index: usize) -> Result<AudioBuffer> {
        if !self.store.exists(index) {
            return Err(self.load_error(index, "artifact is missing".to_string()));
        }

        let bytes = self
            .store
            .read(index)
            .map_err(|e| self.load_error(index, e.to_string()))?;

        AudioBuffer::from_wav_bytes(&bytes).map_err(|e| self.load_error(index, e.to_string()))
    }

    fn load_error(&self, index: usize, message: String) -> AudiobookError {
        AudiobookError::ArtifactLoad {
            index,
            path: self.store.location(index),
            message,
        }
    }
}

/// Deletes artifacts `1..=max_index` when dropped.
struct CleanupGuard<'a, S: ArtifactStore + ?Sized> {
    store: &'a S,
    max_index: usize,
}

impl<S: ArtifactStore + ?Sized> Drop for CleanupGuard<'_, S> {
    fn drop(&mut self) {
        cleanup(self.store, self.max_index);
    }
}

/// Delete every existing artifact in `1..=max_index`.
///
/// Individual failures are logged and skipped. Returns the number of
/// artifacts removed.
pub fn cleanup<S: ArtifactStore + ?Sized>(store: &S, max_index: usize) -> usize {
    let mut removed = 0;

    for index in 1..=max_index {
        if !store.exists(index) {
            continue;
        }
        match store.delete(index) {
            Ok(()) => removed += 1,
            Err(source) => {
                let err = AudiobookError::Cleanup {
                    index,
                    path: store.location(index),
                    source,
                };
                warn!("{}", err);
            }
        }
    }

    debug!("Removed {} intermediate artifacts", removed);
    removed
}
