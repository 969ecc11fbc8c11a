//! Speech engine trait and constructors.

#[cfg(test)]
pub mod mock;
#[cfg(feature = "orca")]
pub mod orca;

use crate::voice::VoiceModel;
use anyhow::Result;
use async_trait::async_trait;

/// Speech engine trait - every TTS backend implements this.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Synthesize `text` with `voice`, returning the bytes of a WAV file.
    async fn synthesize(&self, text: &str, voice: &VoiceModel) -> Result<Vec<u8>>;

    /// Engine name for log output.
    fn name(&self) -> &str;
}

/// Create the Orca speech engine.
///
/// # Arguments
/// * `access_key` - Picovoice access key
#[cfg(feature = "orca")]
pub fn create_engine(access_key: &str) -> Result<Box<dyn SpeechEngine>> {
    Ok(Box::new(orca::OrcaEngine::new(access_key)?))
}

#[cfg(not(feature = "orca"))]
pub fn create_engine(_access_key: &str) -> Result<Box<dyn SpeechEngine>> {
    anyhow::bail!("orca-audiobook was built without the `orca` feature; no speech engine available")
}
