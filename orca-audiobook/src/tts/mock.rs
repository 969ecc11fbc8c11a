//! Mock speech engine for testing
//!
//! Produces deterministic audio whose length follows the input text, records
//! every request, and fails on demand.

use super::SpeechEngine;
use crate::audio::AudioBuffer;
use crate::voice::{Gender, VoiceModel};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// Sample rate of mock audio: one sample per millisecond.
pub const MOCK_SAMPLE_RATE: u32 = 1000;

/// Milliseconds of mock audio per input character.
pub const MS_PER_CHAR: usize = 10;

/// A recorded synthesis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub text: String,
    pub gender: Gender,
}

/// A mock engine for testing orchestration and failure isolation
#[derive(Default)]
pub struct MockEngine {
    /// Requests seen so far, in order
    calls: Mutex<Vec<MockCall>>,
    /// Texts containing any of these fragments fail
    fail_on: Vec<String>,
}

impl MockEngine {
    /// Create an engine that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine that fails for texts containing `fragment`
    pub fn failing_on(fragment: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: vec![fragment.to_string()],
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechEngine for MockEngine {
    async fn synthesize(&self, text: &str, voice: &VoiceModel) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(MockCall {
            text: text.to_string(),
            gender: voice.gender,
        });

        if self.fail_on.iter().any(|fragment| text.contains(fragment.as_str())) {
            anyhow::bail!("mock engine refused: {}", text);
        }

        let samples = vec![1000; text.chars().count() * MS_PER_CHAR];
        Ok(AudioBuffer::from_pcm(MOCK_SAMPLE_RATE, samples).to_wav_bytes()?)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
