//! TOML configuration for envmatch
//!
//! Selects where fingerprints live, how they are encoded on disk, how audio
//! is decoded for extraction and how reference files are named.

use crate::config::ExtractionConfig;
use crate::layout::ReferenceLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EnvmatchConfig {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub storage: FilesystemConfig,
    #[serde(default)]
    pub index: ReferenceLayout,
}

/// Filesystem store configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilesystemConfig {
    #[serde(default = "default_base_directory")]
    pub base_directory: String,
    #[serde(default)]
    pub format: FileFormat,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            format: FileFormat::default(),
        }
    }
}

fn default_base_directory() -> String {
    "./fingerprints".to_string()
}

/// File format for filesystem storage
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json,
    Bson,
    /// Write JSON, read both encodings
    #[default]
    Auto,
}

impl FileFormat {
    /// Extension used when writing
    pub fn write_extension(&self) -> &'static str {
        match self {
            FileFormat::Json | FileFormat::Auto => "json",
            FileFormat::Bson => "bson",
        }
    }

    /// Whether a file with `ext` belongs to this format when reading
    pub fn accepts_extension(&self, ext: &str) -> bool {
        match self {
            FileFormat::Json => ext == "json",
            FileFormat::Bson => ext == "bson",
            FileFormat::Auto => ext == "json" || ext == "bson",
        }
    }
}

impl std::str::FromStr for FileFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(FileFormat::Json),
            "bson" => Ok(FileFormat::Bson),
            "auto" => Ok(FileFormat::Auto),
            other => anyhow::bail!("Unknown file format '{}' (expected json, bson or auto)", other),
        }
    }
}

impl EnvmatchConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: EnvmatchConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.extraction.validate()?;
        self.index.validate()?;
        if self.storage.base_directory.trim().is_empty() {
            anyhow::bail!("storage.base_directory must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnvmatchConfig::default();
        assert_eq!(config.storage.base_directory, "./fingerprints");
        assert_eq!(config.storage.format, FileFormat::Auto);
        assert_eq!(config.extraction.sample_rate, 22050);
        assert_eq!(config.index.count, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
            [extraction]
            sample_rate = 16000

            [storage]
            base_directory = "./test_db"
            format = "bson"

            [index]
            prefix = "clip"
            count = 5
            audio_extension = "flac"
            video_extension = "mkv"
        "#;

        let config: EnvmatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.extraction.sample_rate, 16000);
        assert_eq!(config.storage.base_directory, "./test_db");
        assert_eq!(config.storage.format, FileFormat::Bson);
        assert_eq!(config.index.prefix, "clip");
        assert_eq!(config.index.count, 5);
        assert_eq!(config.index.audio_extension, "flac");
        assert_eq!(config.index.video_extension, "mkv");
    }

    #[test]
    fn test_parse_partial_toml_fills_defaults() {
        let toml_str = r#"
            [storage]
            format = "json"
        "#;

        let config: EnvmatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.storage.format, FileFormat::Json);
        assert_eq!(config.storage.base_directory, "./fingerprints");
        assert_eq!(config.index.prefix, "video");
        assert_eq!(config.extraction.sample_rate, 22050);
    }

    #[test]
    fn test_zero_sample_rate_fails_validation() {
        let toml_str = r#"
            [extraction]
            sample_rate = 0
        "#;
        let config: EnvmatchConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_format_extensions() {
        assert_eq!(FileFormat::Auto.write_extension(), "json");
        assert_eq!(FileFormat::Bson.write_extension(), "bson");
        assert!(FileFormat::Auto.accepts_extension("bson"));
        assert!(!FileFormat::Json.accepts_extension("bson"));
        assert_eq!("BSON".parse::<FileFormat>().unwrap(), FileFormat::Bson);
        assert!("yaml".parse::<FileFormat>().is_err());
    }
}
