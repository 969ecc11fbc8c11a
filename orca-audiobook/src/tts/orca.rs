//! Picovoice Orca backend using PyO3 to embed the `pvorca` Python SDK.
//!
//! One Orca instance is created per model file on first use and reused
//! for the lifetime of the engine.

use super::SpeechEngine;
use crate::audio::AudioBuffer;
use crate::voice::VoiceModel;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Loaded Orca instances keyed by model file.
type HandleCache = Arc<Mutex<HashMap<PathBuf, Py<PyAny>>>>;

/// Orca TTS backend.
pub struct OrcaEngine {
    /// Picovoice access key
    access_key: String,
    handles: HandleCache,
}

impl OrcaEngine {
    /// Create a new Orca engine.
    ///
    /// Fails if the `pvorca` package cannot be imported.
    pub fn new(access_key: impl Into<String>) -> Result<Self> {
        Python::with_gil(|py| py.import("pvorca").map(|_| ())).context(
            "Python package 'pvorca' is not available. Install it with 'pip install pvorca'.",
        )?;

        Ok(Self {
            access_key: access_key.into(),
            handles: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Generate audio with the Orca instance for `model_path`.
    fn synthesize_sync(
        access_key: &str,
        handles: &Mutex<HashMap<PathBuf, Py<PyAny>>>,
        text: &str,
        model_path: &Path,
    ) -> Result<AudioBuffer> {
        Python::with_gil(|py| {
            let mut handles = handles
                .lock()
                .map_err(|_| anyhow::anyhow!("Orca handle cache poisoned"))?;

            let orca = match handles.get(model_path) {
                Some(handle) => handle.clone_ref(py),
                None => {
                    debug!("Loading Orca model {}", model_path.display());
                    let pvorca = py.import("pvorca")?;
                    let kwargs = PyDict::new(py);
                    kwargs.set_item("access_key", access_key)?;
                    kwargs.set_item("model_path", model_path.to_string_lossy().as_ref())?;
                    let handle = pvorca
                        .call_method("create", (), Some(&kwargs))
                        .with_context(|| {
                            format!("Failed to load Orca model {}", model_path.display())
                        })?
                        .unbind();
                    handles.insert(model_path.to_path_buf(), handle.clone_ref(py));
                    handle
                }
            };
            let orca = orca.bind(py);

            let sample_rate: u32 = orca.getattr("sample_rate")?.extract()?;
            let result = orca.call_method1("synthesize", (text,))?;

            // synthesize() returns (pcm, alignments)
            let pcm: Vec<i16> = result.get_item(0)?.extract()?;

            Ok(AudioBuffer::from_pcm(sample_rate, pcm))
        })
    }
}

#[async_trait]
impl SpeechEngine for OrcaEngine {
    async fn synthesize(&self, text: &str, voice: &VoiceModel) -> Result<Vec<u8>> {
        // Clone data for the blocking task
        let text = text.to_string();
        let model_path = voice.model_path.clone();
        let access_key = self.access_key.clone();
        let handles = Arc::clone(&self.handles);

        let audio = tokio::task::spawn_blocking(move || {
            Self::synthesize_sync(&access_key, &handles, &text, &model_path)
        })
        .await
        .context("Task join error")??;

        Ok(audio.to_wav_bytes()?)
    }

    fn name(&self) -> &str {
        "orca"
    }
}

impl Drop for OrcaEngine {
    fn drop(&mut self) {
        let handles = &self.handles;

        // Release native resources held by each Orca instance
        Python::with_gil(|py| {
            let Ok(mut handles) = handles.lock() else {
                return;
            };
            for (model_path, handle) in handles.drain() {
                if let Err(e) = handle.bind(py).call_method0("delete") {
                    warn!("Failed to release Orca model {}: {}", model_path.display(), e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orca_engine_creation_without_sdk() {
        // Either pvorca is installed or creation fails with an install hint
        match OrcaEngine::new("test-key") {
            Ok(engine) => assert_eq!(engine.name(), "orca"),
            Err(e) => {
                let msg = e.to_string();
                assert!(msg.contains("pvorca"), "Error should mention pvorca: {}", msg);
            }
        }
    }
}
