//! Fingerprint store trait and the filesystem implementation
//!
//! One record per fingerprint, `<base_dir>/<id>.json` or `<id>.bson`.

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::collection::FingerprintCollection;
use crate::error::{Error, Result};
use crate::fingerprint::{to_tenths, Fingerprint};
use crate::storage_config::{FileFormat, FilesystemConfig};
use envmatch_fp::EnvelopeFile;

/// Metadata stored alongside an envelope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FingerprintMetadata {
    pub original_path: String,
    pub algorithm: String,
    pub sample_rate: u32,
    pub duration_ms: u32,
    pub channels: u16,
    /// RFC 3339 time the record was written. Filled in by the store on
    /// save; any value passed to `save` is ignored.
    pub created_at: String,
}

/// Durable fingerprint storage
pub trait FingerprintStore: Send + Sync {
    /// Persist one fingerprint, replacing any record with the same id.
    /// Returns where it was written.
    fn save(&self, fingerprint: &Fingerprint, metadata: &FingerprintMetadata) -> Result<PathBuf>;

    /// Load a single fingerprint by id
    fn load(&self, id: &str) -> Result<Fingerprint>;

    /// Load every readable fingerprint.
    ///
    /// Unreadable records are logged and skipped. Fails with `NotFound` when
    /// nothing could be loaded.
    fn load_all(&self) -> Result<FingerprintCollection>;

    /// Get metadata for a fingerprint
    fn get_metadata(&self, id: &str) -> Result<Option<FingerprintMetadata>>;
}

/// Filesystem-based store
pub struct FilesystemStore {
    base_dir: PathBuf,
    format: FileFormat,
}

impl FilesystemStore {
    pub fn new(config: &FilesystemConfig) -> Self {
        Self {
            base_dir: PathBuf::from(&config.base_directory),
            format: config.format,
        }
    }

    /// Create from directory path and format
    pub fn from_path(base_dir: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            base_dir: base_dir.into(),
            format,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Find the record file for `id`
    fn find_file(&self, id: &str) -> Result<PathBuf> {
        let candidates: &[&str] = match self.format {
            FileFormat::Auto => &["json", "bson"],
            FileFormat::Json => &["json"],
            FileFormat::Bson => &["bson"],
        };

        candidates
            .iter()
            .map(|ext| self.base_dir.join(format!("{}.{}", id, ext)))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "no fingerprint for '{}' in {}",
                    id,
                    self.base_dir.display()
                ))
            })
    }

    /// Record files in the base directory, sorted by path
    fn record_files(&self) -> Result<Vec<PathBuf>> {
        if !self.base_dir.is_dir() {
            return Err(Error::NotFound(format!(
                "fingerprint directory {} does not exist",
                self.base_dir.display()
            )));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .map(|ext| self.format.accepts_extension(ext))
                    .unwrap_or(false)
            })
            .collect();

        // Same stem: json ahead of bson, the order `find_file` tries them
        files.sort_by(|a, b| {
            a.file_stem()
                .cmp(&b.file_stem())
                .then_with(|| record_rank(a).cmp(&record_rank(b)))
        });
        Ok(files)
    }

    /// Drop the record for `id` written in the other encoding, if any
    fn remove_stale_sibling(&self, id: &str, written_ext: &str) -> Result<()> {
        let other = if written_ext == "json" { "bson" } else { "json" };
        let stale = self.base_dir.join(format!("{}.{}", id, other));
        if stale.is_file() {
            std::fs::remove_file(&stale)?;
            log::debug!("Removed stale record {}", stale.display());
        }
        Ok(())
    }
}

fn record_rank(path: &Path) -> u8 {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => 0,
        _ => 1,
    }
}

impl FingerprintStore for FilesystemStore {
    fn save(&self, fingerprint: &Fingerprint, metadata: &FingerprintMetadata) -> Result<PathBuf> {
        validate_id(&fingerprint.id)?;
        // Anything off the tenths grid could not be loaded back
        fingerprint.quantize()?;

        let file = EnvelopeFile::new(
            fingerprint.id.clone(),
            fingerprint.envelope.clone(),
            metadata.original_path.clone(),
            metadata.sample_rate,
            metadata.duration_ms,
            metadata.channels,
        );

        std::fs::create_dir_all(&self.base_dir)?;

        let ext = self.format.write_extension();
        let file_path = self.base_dir.join(format!("{}.{}", fingerprint.id, ext));

        match self.format {
            FileFormat::Bson => file.save_bson(&file_path)?,
            FileFormat::Json | FileFormat::Auto => file.save(&file_path)?,
        }
        self.remove_stale_sibling(&fingerprint.id, ext)?;

        log::debug!(
            "Saved {} ({}s) to {}",
            fingerprint.id,
            fingerprint.len(),
            file_path.display()
        );

        Ok(file_path)
    }

    fn load(&self, id: &str) -> Result<Fingerprint> {
        validate_id(id)?;
        let path = self.find_file(id)?;
        read_record(&path).map(|(fp, _)| fp)
    }

    fn load_all(&self) -> Result<FingerprintCollection> {
        let files = self.record_files()?;

        log::info!(
            "Found {} fingerprint files in {}, loading in parallel...",
            files.len(),
            self.base_dir.display()
        );

        // Parallel load; the collection re-imposes id order afterwards
        let loaded: Vec<Result<(Fingerprint, FingerprintMetadata)>> =
            files.par_iter().map(|path| read_record(path)).collect();

        let mut collection = FingerprintCollection::new();
        for (path, record) in files.iter().zip(loaded) {
            match record {
                Ok((fp, _)) => {
                    if collection.contains(&fp.id) {
                        log::warn!(
                            "Duplicate fingerprint id '{}' in {}, keeping the first",
                            fp.id,
                            path.display()
                        );
                        continue;
                    }
                    collection.insert(fp);
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        if collection.is_empty() {
            return Err(Error::NotFound(format!(
                "no fingerprints could be loaded from {}",
                self.base_dir.display()
            )));
        }

        log::info!("Loaded {} fingerprints", collection.len());
        Ok(collection)
    }

    fn get_metadata(&self, id: &str) -> Result<Option<FingerprintMetadata>> {
        validate_id(id)?;
        let path = match self.find_file(id) {
            Ok(path) => path,
            Err(Error::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        read_record(&path).map(|(_, meta)| Some(meta))
    }
}

/// Read and validate one record
fn read_record(path: &Path) -> Result<(Fingerprint, FingerprintMetadata)> {
    let parse_error = |message: String| Error::Parse {
        path: path.to_path_buf(),
        message,
    };

    let file = EnvelopeFile::load_auto(path).map_err(|e| parse_error(format!("{:#}", e)))?;

    validate_id(file.id()).map_err(|e| parse_error(e.to_string()))?;

    if let Some((second, value)) = file
        .envelope
        .iter()
        .enumerate()
        .find(|(_, v)| to_tenths(**v).is_none())
    {
        return Err(parse_error(format!(
            "envelope value {} at second {} is not a one-decimal amplitude",
            value, second
        )));
    }

    if path.file_stem().and_then(|s| s.to_str()) != Some(file.id()) {
        log::debug!(
            "Record {} carries id '{}' different from its file name",
            path.display(),
            file.id()
        );
    }

    let metadata = FingerprintMetadata {
        original_path: file.metadata.original_path,
        algorithm: file.metadata.algorithm,
        sample_rate: file.metadata.sample_rate,
        duration_ms: file.metadata.duration_ms,
        channels: file.metadata.channels,
        created_at: file.metadata.created_at,
    };

    Ok((Fingerprint::new(file.metadata.id, file.envelope), metadata))
}

/// Ids double as file stems
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '\0'])
    {
        return Err(Error::InvalidInput(format!(
            "'{}' is not a usable fingerprint id",
            id
        )));
    }
    Ok(())
}
