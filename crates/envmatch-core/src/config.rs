//! Envelope extraction parameters

use serde::{Deserialize, Serialize};

/// Rate audio is decoded to before extraction (librosa's default load rate)
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Extraction configuration
///
/// Reference and query clips must be fingerprinted with the same settings,
/// otherwise their per-second envelopes are not comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Target decode sample rate (Hz); one envelope value per this many samples
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

impl ExtractionConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sample_rate == 0 {
            anyhow::bail!("Sample rate must be > 0");
        }
        Ok(())
    }
}
