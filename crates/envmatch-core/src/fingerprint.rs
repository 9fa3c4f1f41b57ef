//! Per-second peak amplitude envelopes
//!
//! A fingerprint is the loudness outline of a recording: for every whole
//! second of mono audio, the peak absolute sample value rounded to one
//! decimal place. A trailing partial second is dropped, for references and
//! queries alike, so every envelope element covers exactly one second.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A named per-second envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Identifier of the recording (e.g. `video7`)
    pub id: String,
    /// Peak amplitude per second, index = second offset
    pub envelope: Vec<f64>,
}

impl Fingerprint {
    pub fn new(id: impl Into<String>, envelope: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            envelope,
        }
    }

    /// Fingerprint a mono waveform
    pub fn from_samples(id: impl Into<String>, samples: &[f32], sample_rate: u32) -> Result<Self> {
        let envelope = extract_envelope(samples, sample_rate)?;
        Ok(Self::new(id, envelope))
    }

    /// Envelope length in seconds
    pub fn len(&self) -> usize {
        self.envelope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelope.is_empty()
    }

    /// Envelope in integer tenths of amplitude.
    ///
    /// Fails with `InvalidInput` on the first value that is not a
    /// non-negative multiple of 0.1.
    pub fn quantize(&self) -> Result<Vec<u32>> {
        self.envelope
            .iter()
            .enumerate()
            .map(|(second, &value)| {
                to_tenths(value).ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "'{}': value {} at second {} is not a one-decimal amplitude",
                        self.id, value, second
                    ))
                })
            })
            .collect()
    }
}

/// Extract the per-second peak envelope of a mono waveform.
///
/// The waveform is cut into consecutive chunks of `sample_rate` samples; any
/// remainder shorter than one second is discarded. Each chunk contributes
/// `max(|x|)` rounded to one decimal.
pub fn extract_envelope(samples: &[f32], sample_rate: u32) -> Result<Vec<f64>> {
    if sample_rate == 0 {
        return Err(Error::InvalidInput("sample rate must be > 0".to_string()));
    }

    let envelope: Vec<f64> = samples
        .chunks_exact(sample_rate as usize)
        .map(|chunk| round_to_tenth(peak(chunk)))
        .collect();

    log::trace!(
        "Extracted {} second(s) from {} samples @ {}Hz",
        envelope.len(),
        samples.len(),
        sample_rate
    );

    Ok(envelope)
}

fn peak(chunk: &[f32]) -> f64 {
    chunk
        .iter()
        .map(|s| s.abs())
        .fold(0.0f32, f32::max) as f64
}

/// Round half away from zero to one decimal place
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Slack for binary representation error (0.1 * 3 == 0.30000000000000004)
const TENTH_TOLERANCE: f64 = 1e-6;

/// Integer tenths of a one-decimal amplitude.
///
/// `None` for negative or non-finite values, values off the 0.1 grid, and
/// values beyond the `u32` range.
pub fn to_tenths(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let scaled = value * 10.0;
    let tenths = scaled.round();
    if (scaled - tenths).abs() > TENTH_TOLERANCE || tenths > u32::MAX as f64 {
        return None;
    }
    Some(tenths as u32)
}
