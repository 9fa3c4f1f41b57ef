//! Audio decoding for multiple formats

use super::{resample_to_target, AudioFormat};
use anyhow::{Context, Result};
use std::path::Path;

/// Decoded audio data, interleaved when `channels > 1`
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_ms: u32,
}

impl AudioData {
    pub(crate) fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 || channels == 0 {
            anyhow::bail!(
                "Decoder reported an invalid stream ({} Hz, {} channels)",
                sample_rate,
                channels
            );
        }
        let frames = samples.len() / channels as usize;
        let duration_ms = (frames as u64 * 1000 / sample_rate as u64) as u32;
        Ok(Self {
            samples,
            sample_rate,
            channels,
            duration_ms,
        })
    }

    /// Convert to mono by averaging channels
    pub fn to_mono(&self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples.clone();
        }

        self.samples
            .chunks_exact(self.channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    }

    /// Mix down to mono and resample to `target_rate`
    pub fn into_mono_at(self, target_rate: u32) -> Result<Self> {
        let original_rate = self.sample_rate;
        let channels = self.channels;
        let duration_ms = self.duration_ms;

        let mono = if channels > 1 { self.to_mono() } else { self.samples };
        let samples = resample_to_target(&mono, original_rate, target_rate)?;

        if original_rate != target_rate || channels > 1 {
            log::debug!(
                "Converted {} ch @ {}Hz to mono @ {}Hz",
                channels,
                original_rate,
                target_rate
            );
        }

        Ok(Self {
            samples,
            sample_rate: target_rate,
            channels: 1,
            duration_ms,
        })
    }
}

/// Decode a media file to mono samples at `target_sample_rate`
pub fn decode_audio(path: &Path, target_sample_rate: u32) -> Result<AudioData> {
    if !path.exists() {
        anyhow::bail!("Audio file not found: {}", path.display());
    }
    if target_sample_rate == 0 {
        anyhow::bail!("Target sample rate must be > 0");
    }

    let format = AudioFormat::from_path(path);

    let audio_data = match format {
        AudioFormat::Wav => decode_wav(path)?,
        AudioFormat::Mp3 => decode_mp3(path)?,
        AudioFormat::Flac => decode_flac(path)?,
        AudioFormat::Ogg => decode_ogg(path)?,
        // Containers and anything unrecognised go through Symphonia's probe
        _ => super::extract_audio_from_video(path)?,
    };

    log::debug!(
        "Decoded {} ({:?}): {} ch @ {}Hz, {:.1}s",
        path.display(),
        format,
        audio_data.channels,
        audio_data.sample_rate,
        audio_data.duration_ms as f64 / 1000.0
    );

    audio_data.into_mono_at(target_sample_rate)
}

/// Decode WAV file
fn decode_wav(path: &Path) -> Result<AudioData> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;

    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    AudioData::new(samples, spec.sample_rate, spec.channels)
}

/// Decode MP3 file
fn decode_mp3(path: &Path) -> Result<AudioData> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read MP3 file: {}", path.display()))?;

    let mut decoder = minimp3::Decoder::new(&data[..]);
    let mut samples = Vec::new();
    let mut sample_rate = 0;
    let mut channels = 0;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = frame.sample_rate as u32;
                    channels = frame.channels as u16;
                }
                samples.extend(frame.data.iter().map(|&s| s as f32 / 32768.0));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => anyhow::bail!("MP3 decode error in {}: {}", path.display(), e),
        }
    }

    AudioData::new(samples, sample_rate, channels)
}

/// Decode FLAC file
fn decode_flac(path: &Path) -> Result<AudioData> {
    let mut reader = claxon::FlacReader::open(path)
        .with_context(|| format!("Failed to open FLAC file: {}", path.display()))?;

    let info = reader.streaminfo();
    let scale = (1i64 << (info.bits_per_sample - 1)) as f32;

    let samples: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / scale))
        .collect::<Result<Vec<_>, _>>()?;

    AudioData::new(samples, info.sample_rate, info.channels as u16)
}

/// Decode OGG Vorbis file
fn decode_ogg(path: &Path) -> Result<AudioData> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open OGG file: {}", path.display()))?;

    let mut reader = lewton::inside_ogg::OggStreamReader::new(file)?;

    let sample_rate = reader.ident_hdr.audio_sample_rate;
    let channels = reader.ident_hdr.audio_channels as u16;

    let mut samples = Vec::new();
    while let Some(packet) = reader.read_dec_packet_itl()? {
        samples.extend(packet.iter().map(|&s| s as f32 / 32768.0));
    }

    AudioData::new(samples, sample_rate, channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_to_mono_averages_channels() {
        let audio = AudioData::new(vec![1.0, 0.0, 0.5, -0.5], 2, 2).unwrap();
        assert_eq!(audio.to_mono(), vec![0.5, 0.0]);
        assert_eq!(audio.duration_ms, 1000);
    }

    #[test]
    fn test_decode_stereo_wav_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video1.wav");
        // 3 stereo frames @ 3 Hz = 1 second
        write_wav(&path, 2, 3, &[16384, 16384, -32768, 0, 0, 0]);

        let audio = decode_audio(&path, 3).unwrap();
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.sample_rate, 3);
        assert_eq!(audio.samples, vec![0.5, -0.5, 0.0]);
        assert_eq!(audio.duration_ms, 1000);
    }

    #[test]
    fn test_decode_resamples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 1, 8, &[0; 16]);

        let audio = decode_audio(&path, 4).unwrap();
        assert_eq!(audio.sample_rate, 4);
        assert_eq!(audio.samples.len(), 8);
    }

    #[test]
    fn test_missing_file() {
        assert!(decode_audio(Path::new("/definitely/not/here.wav"), 22050).is_err());
    }
}
