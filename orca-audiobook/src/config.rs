//! orca-audiobook configuration management.
//!
//! Settings come from `~/.config/cli-programs/orca-audiobook.toml`, are
//! overridden by the `ACCESS_KEY`, `MODEL_PATH` and `OUTPUT_PATH`
//! environment variables, and finally by command-line flags.

use crate::error::AudiobookError;
use crate::text::chunker::DEFAULT_MAX_LENGTH;
use crate::voice::{Gender, Language, required_models};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the Picovoice access key.
pub const ENV_ACCESS_KEY: &str = "ACCESS_KEY";
/// Environment variable holding the model directory.
pub const ENV_MODEL_PATH: &str = "MODEL_PATH";
/// Environment variable holding the output directory.
pub const ENV_OUTPUT_PATH: &str = "OUTPUT_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudiobookConfig {
    /// Picovoice access key
    #[serde(default)]
    pub access_key: Option<String>,

    /// Directory holding the `orca_params_*.pv` model files
    #[serde(default)]
    pub model_dir: Option<PathBuf>,

    /// Directory for artifacts and the finished audiobook
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Maximum characters per synthesis unit
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// FFmpeg executable used for MP3 export
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
}

fn default_chunk_size() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl Default for AudiobookConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            model_dir: None,
            output_dir: None,
            chunk_size: default_chunk_size(),
            ffmpeg: default_ffmpeg(),
        }
    }
}

/// Configuration checked to be complete for one run.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub access_key: String,
    pub model_dir: PathBuf,
    pub output_dir: PathBuf,
    pub chunk_size: usize,
    pub ffmpeg: PathBuf,
}

impl AudiobookConfig {
    /// Get the config file path: ~/.config/cli-programs/orca-audiobook.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("cli-programs")
            .join("orca-audiobook.toml")
    }

    /// Load config from the default location, returning defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Apply environment overrides. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup(ENV_ACCESS_KEY) {
            self.access_key = Some(key);
        }
        if let Some(dir) = lookup(ENV_MODEL_PATH) {
            self.model_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(ENV_OUTPUT_PATH) {
            self.output_dir = Some(PathBuf::from(dir));
        }
    }

    /// Check that a run with `(language, gender)` can start.
    ///
    /// Requires an access key, a model directory containing both model
    /// files the run loads, and an output directory, which is created if
    /// missing.
    pub fn validate(
        &self,
        language: Language,
        gender: Gender,
    ) -> std::result::Result<ValidatedConfig, AudiobookError> {
        let access_key = self
            .access_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AudiobookError::Configuration(format!(
                    "Picovoice access key is not set. Set {} or 'access_key' in {}",
                    ENV_ACCESS_KEY,
                    Self::config_path().display()
                ))
            })?;

        let model_dir = self.model_dir.clone().ok_or_else(|| {
            AudiobookError::Configuration(format!(
                "Model directory is not set. Set {}, pass --model-dir or run 'orca-audiobook config set-model-dir'",
                ENV_MODEL_PATH
            ))
        })?;
        if !model_dir.is_dir() {
            return Err(AudiobookError::Configuration(format!(
                "Model directory does not exist: {}",
                model_dir.display()
            )));
        }

        let missing: Vec<String> = required_models(&model_dir, language, gender)
            .into_iter()
            .filter(|path| !path.is_file())
            .map(|path| path.display().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AudiobookError::Configuration(format!(
                "Missing Orca model file(s): {}",
                missing.join(", ")
            )));
        }

        let output_dir = self.output_dir.clone().ok_or_else(|| {
            AudiobookError::Configuration(format!(
                "Output directory is not set. Set {}, pass --output-dir or run 'orca-audiobook config set-output-dir'",
                ENV_OUTPUT_PATH
            ))
        })?;
        fs::create_dir_all(&output_dir).map_err(|e| {
            AudiobookError::Configuration(format!(
                "Cannot create output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        if self.chunk_size == 0 {
            return Err(AudiobookError::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        Ok(ValidatedConfig {
            access_key,
            model_dir,
            output_dir,
            chunk_size: self.chunk_size,
            ffmpeg: self.ffmpeg.clone(),
        })
    }
}
