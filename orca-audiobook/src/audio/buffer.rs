//! In-memory 16-bit PCM audio backed by `hound` for WAV I/O.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Unsupported sample format: {bits}-bit {format:?} (expected 16-bit integer PCM)")]
    UnsupportedFormat { bits: u16, format: SampleFormat },

    #[error(
        "Incompatible audio: {found_rate} Hz / {found_channels} ch does not match {expected_rate} Hz / {expected_channels} ch"
    )]
    Incompatible {
        expected_rate: u32,
        expected_channels: u16,
        found_rate: u32,
        found_channels: u16,
    },
}

/// Interleaved 16-bit PCM samples plus their format.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    spec: WavSpec,
    samples: Vec<i16>,
}

impl AudioBuffer {
    /// Wrap mono 16-bit PCM as produced by the speech engine.
    pub fn from_pcm(sample_rate: u32, samples: Vec<i16>) -> Self {
        Self {
            spec: pcm_spec(sample_rate, 1),
            samples,
        }
    }

    /// Decode a WAV file held in memory.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(AudioError::UnsupportedFormat {
                bits: spec.bits_per_sample,
                format: spec.sample_format,
            });
        }

        let samples = reader.into_samples::<i16>().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { spec, samples })
    }

    /// Silence of `duration_ms` in the given format.
    pub fn silence(spec: WavSpec, duration_ms: u64) -> Self {
        let frames = spec.sample_rate as u64 * duration_ms / 1000;
        Self {
            spec,
            samples: vec![0; (frames * spec.channels as u64) as usize],
        }
    }

    /// Append `other` after this buffer. Both must share rate and channel count.
    pub fn append(&mut self, other: &AudioBuffer) -> Result<(), AudioError> {
        if self.spec.sample_rate != other.spec.sample_rate
            || self.spec.channels != other.spec.channels
        {
            return Err(AudioError::Incompatible {
                expected_rate: self.spec.sample_rate,
                expected_channels: self.spec.channels,
                found_rate: other.spec.sample_rate,
                found_channels: other.spec.channels,
            });
        }

        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    /// Append `duration_ms` of silence in this buffer's format.
    pub fn append_silence(&mut self, duration_ms: u64) {
        let silence = Self::silence(self.spec, duration_ms);
        self.samples.extend_from_slice(&silence.samples);
    }

    /// Duration in milliseconds, rounded down.
    pub fn duration_ms(&self) -> u64 {
        let frames = self.samples.len() as u64 / self.spec.channels.max(1) as u64;
        frames * 1000 / self.spec.sample_rate.max(1) as u64
    }

    /// Encode as a complete WAV file.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, AudioError> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, self.spec)?;
            for &sample in &self.samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    /// Write as a WAV file on disk.
    pub fn write_wav(&self, path: &Path) -> Result<(), AudioError> {
        let mut writer = WavWriter::create(path, self.spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

fn pcm_spec(sample_rate: u32, channels: u16) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}
