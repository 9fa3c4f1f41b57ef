//! envmatch core - loudness envelope fingerprinting and clip matching
//!
//! A recording is reduced to its per-second peak amplitude envelope. A short
//! clip is located inside a library of such envelopes by sliding it over each
//! one and minimising the L1 distance.

pub mod audio;
pub mod collection;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod layout;
pub mod matching;
pub mod storage_backend;
pub mod storage_config;

pub use collection::{natural_cmp, FingerprintCollection};
pub use config::ExtractionConfig;
pub use error::{Error, Result};
pub use fingerprint::{extract_envelope, to_tenths, Fingerprint};
pub use layout::ReferenceLayout;
pub use matching::{best_alignment, Alignment, MatchResult, Matcher};
pub use storage_backend::{FilesystemStore, FingerprintMetadata, FingerprintStore};
pub use storage_config::{EnvmatchConfig, FileFormat, FilesystemConfig};

use std::path::Path;

/// Decode a media file and fingerprint it under `id`.
///
/// Also returns the metadata worth storing with the envelope.
pub fn generate_fingerprint(
    audio_path: &Path,
    id: &str,
    config: &ExtractionConfig,
) -> anyhow::Result<(Fingerprint, FingerprintMetadata)> {
    config.validate()?;

    let audio_data = audio::decode_audio(audio_path, config.sample_rate)?;
    let fingerprint = Fingerprint::from_samples(id, &audio_data.samples, audio_data.sample_rate)?;

    let metadata = FingerprintMetadata {
        original_path: audio_path.display().to_string(),
        algorithm: envmatch_fp::ALGORITHM_ID.to_string(),
        sample_rate: audio_data.sample_rate,
        duration_ms: audio_data.duration_ms,
        channels: 1,
        created_at: String::new(),
    };

    Ok((fingerprint, metadata))
}
