//! Envelope fingerprint files
//!
//! One file per reference recording. The same structure is written either as
//! pretty JSON (`.json`) or as a BSON document (`.bson`); both keep the
//! envelope values as 64-bit floats so a saved record loads back bit-for-bit.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Algorithm identifier written into every record
pub const ALGORITHM_ID: &str = "PEAK_ENVELOPE";

/// Current record layout version
pub const FORMAT_VERSION: &str = "1.0";

/// Complete fingerprint file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeFile {
    pub version: String,
    pub metadata: EnvelopeMetadata,
    /// Per-second peak amplitudes, one decimal place
    pub envelope: Vec<f64>,
}

/// Metadata about the fingerprinted recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    /// Fingerprint identifier, also the file stem
    pub id: String,
    #[serde(default)]
    pub original_path: String,
    pub algorithm: String,
    #[serde(default)]
    pub sample_rate: u32,
    #[serde(default)]
    pub duration_ms: u32,
    #[serde(default)]
    pub channels: u16,
    #[serde(default)]
    pub created_at: String,
}

impl EnvelopeFile {
    /// Create a new record stamped with the current time
    pub fn new(
        id: String,
        envelope: Vec<f64>,
        original_path: String,
        sample_rate: u32,
        duration_ms: u32,
        channels: u16,
    ) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            metadata: EnvelopeMetadata {
                id,
                original_path,
                algorithm: ALGORITHM_ID.to_string(),
                sample_rate,
                duration_ms,
                channels,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
            envelope,
        }
    }

    /// Identifier of the fingerprinted recording
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json_str = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json_str)
            .with_context(|| format!("Failed to write fingerprint file: {}", path.display()))?;
        Ok(())
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fingerprint file: {}", path.display()))?;
        let file: EnvelopeFile = serde_json::from_str(&json_str)
            .with_context(|| format!("Invalid JSON fingerprint: {}", path.display()))?;
        Ok(file)
    }

    /// Save as a BSON document
    pub fn save_bson(&self, path: &Path) -> Result<()> {
        let bytes = bson::to_vec(self)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write fingerprint file: {}", path.display()))?;
        Ok(())
    }

    /// Load from a BSON document
    pub fn load_bson(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read fingerprint file: {}", path.display()))?;
        let file: EnvelopeFile = bson::from_slice(&bytes)
            .with_context(|| format!("Invalid BSON fingerprint: {}", path.display()))?;
        Ok(file)
    }

    /// Load either encoding, chosen by file extension
    pub fn load_auto(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bson") => Self::load_bson(path),
            Some("json") => Self::load(path),
            _ => anyhow::bail!("Unknown fingerprint file extension: {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EnvelopeFile {
        EnvelopeFile::new(
            "video3".to_string(),
            vec![0.0, 0.1, 0.9, 1.0, 0.3],
            "refs/video3.wav".to_string(),
            22050,
            5000,
            1,
        )
    }

    #[test]
    fn test_json_keeps_float_literals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video3.json");
        let original = sample();
        original.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("0.0"));
        assert!(text.contains("1.0"));
        assert!(text.contains("\"algorithm\": \"PEAK_ENVELOPE\""));

        let loaded = EnvelopeFile::load_auto(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_bson_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video3.bson");
        let original = sample();
        original.save_bson(&path).unwrap();

        let loaded = EnvelopeFile::load_auto(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(EnvelopeFile::load(&path).is_err());

        let other = dir.path().join("notes.txt");
        std::fs::write(&other, "hello").unwrap();
        assert!(EnvelopeFile::load_auto(&other).is_err());
    }

    #[test]
    fn test_missing_optional_metadata_defaults() {
        let json = r#"{
            "version": "1.0",
            "metadata": { "id": "video1", "algorithm": "PEAK_ENVELOPE" },
            "envelope": [0.5, 0.2]
        }"#;
        let file: EnvelopeFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id(), "video1");
        assert_eq!(file.metadata.sample_rate, 0);
        assert_eq!(file.envelope, vec![0.5, 0.2]);
    }
}
