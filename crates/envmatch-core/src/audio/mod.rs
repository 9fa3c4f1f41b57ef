//! Audio decoding and resampling
//!
//! Turns a media file into a mono waveform at a fixed rate, the input the
//! envelope extractor expects. Supports WAV, MP3, FLAC, OGG and the audio
//! track of common video containers.

mod decoder;
mod resample;
mod video;

pub use decoder::{decode_audio, AudioData};
pub use resample::resample_to_target;
pub use video::extract_audio_from_video;

use std::path::Path;

/// Supported audio and video formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    // Pure audio formats
    Wav,
    Mp3,
    Flac,
    Ogg,

    // Video containers (audio track only)
    Mp4,
    Mkv,
    Mov,
    Webm,

    Unknown,
}

impl AudioFormat {
    /// Detect format from file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("wav") | Some("wave") => AudioFormat::Wav,
            Some("mp3") => AudioFormat::Mp3,
            Some("flac") => AudioFormat::Flac,
            Some("ogg") | Some("oga") => AudioFormat::Ogg,

            Some("mp4") | Some("m4a") | Some("m4v") => AudioFormat::Mp4,
            Some("mkv") | Some("mka") => AudioFormat::Mkv,
            Some("mov") => AudioFormat::Mov,
            Some("webm") => AudioFormat::Webm,

            _ => AudioFormat::Unknown,
        }
    }

    /// Check if format is a video container
    pub fn is_video_container(&self) -> bool {
        matches!(
            self,
            AudioFormat::Mp4 | AudioFormat::Mkv | AudioFormat::Mov | AudioFormat::Webm
        )
    }
}
