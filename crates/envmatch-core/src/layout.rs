//! Naming convention for reference recordings
//!
//! References are numbered from 1: `<dir>/<prefix><n>.<ext>`. The same id
//! (`<prefix><n>`) names the audio file, the stored fingerprint and the video
//! handed to a player.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReferenceLayout {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Number of references expected
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_audio_extension")]
    pub audio_extension: String,
    #[serde(default = "default_video_extension")]
    pub video_extension: String,
}

impl Default for ReferenceLayout {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            count: default_count(),
            audio_extension: default_audio_extension(),
            video_extension: default_video_extension(),
        }
    }
}

fn default_prefix() -> String {
    "video".to_string()
}
fn default_count() -> usize {
    20
}
fn default_audio_extension() -> String {
    "wav".to_string()
}
fn default_video_extension() -> String {
    "mp4".to_string()
}

impl ReferenceLayout {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.prefix.is_empty() {
            anyhow::bail!("index.prefix must not be empty");
        }
        if self.count == 0 {
            anyhow::bail!("index.count must be > 0");
        }
        if self.audio_extension.is_empty() || self.video_extension.is_empty() {
            anyhow::bail!("index extensions must not be empty");
        }
        Ok(())
    }

    /// Id of the `index`-th reference (1-based)
    pub fn id(&self, index: usize) -> String {
        format!("{}{}", self.prefix, index)
    }

    /// `(id, audio path)` for every expected reference, in index order
    pub fn audio_paths(&self, dir: &Path) -> Vec<(String, PathBuf)> {
        (1..=self.count)
            .map(|i| {
                let id = self.id(i);
                let path = dir.join(format!("{}.{}", id, self.audio_extension));
                (id, path)
            })
            .collect()
    }

    /// Video file a player should open for a matched id
    pub fn video_path(&self, dir: &Path, id: &str) -> PathBuf {
        dir.join(format!("{}.{}", id, self.video_extension))
    }
}
