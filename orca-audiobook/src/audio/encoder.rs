//! Final audiobook export using FFmpeg.

use super::buffer::AudioBuffer;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Default MP3 bitrate.
const DEFAULT_BITRATE: &str = "128k";

/// Writes a finished buffer to its final container format.
pub trait AudioEncoder {
    /// Encode `audio` to `output_path`.
    fn encode(&self, audio: &AudioBuffer, output_path: &Path) -> Result<()>;

    /// File extension of the produced file.
    fn extension(&self) -> &str;
}

/// MP3 export through the `ffmpeg` executable (libmp3lame).
#[derive(Debug, Clone)]
pub struct Mp3Encoder {
    ffmpeg: PathBuf,
    bitrate: String,
}

impl Mp3Encoder {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            bitrate: DEFAULT_BITRATE.to_string(),
        }
    }

    fn ffmpeg_command(&self) -> Command {
        Command::new(&self.ffmpeg)
    }

    /// Check if FFmpeg can be executed.
    pub fn is_available(&self) -> bool {
        self.ffmpeg_command()
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl AudioEncoder for Mp3Encoder {
    fn encode(&self, audio: &AudioBuffer, output_path: &Path) -> Result<()> {
        let temp_dir = TempDir::new()?;
        let wav_path = temp_dir.path().join("audiobook.wav");
        audio
            .write_wav(&wav_path)
            .context("Failed to write intermediate WAV")?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let output = self
            .ffmpeg_command()
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(&wav_path)
            .args(["-codec:a", "libmp3lame", "-b:a", self.bitrate.as_str(), "-f", "mp3"])
            .arg(output_path)
            .output()
            .with_context(|| format!("Failed to run {}", self.ffmpeg.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg MP3 export failed: {}", stderr.trim());
        }

        Ok(())
    }

    fn extension(&self) -> &str {
        "mp3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_available() {
        // Only checks the availability check doesn't panic
        let _ = Mp3Encoder::new("ffmpeg").is_available();
    }

    #[test]
    fn test_missing_ffmpeg_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let encoder = Mp3Encoder::new(temp_dir.path().join("no-such-ffmpeg"));
        assert!(!encoder.is_available());

        let audio = AudioBuffer::from_pcm(8000, vec![0; 800]);
        let result = encoder.encode(&audio, &temp_dir.path().join("out.mp3"));
        assert!(result.is_err());
        assert!(!temp_dir.path().join("out.mp3").exists());
    }
}
