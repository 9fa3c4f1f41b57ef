//! envgen - Build the reference fingerprint index
//!
//! Usage: envgen <audio_dir> [--count 20] [--output ./fingerprints]
//!
//! Expects `<prefix>1.<ext>` … `<prefix><count>.<ext>` in `audio_dir`.

use anyhow::{Context, Result};
use clap::Parser;
use envmatch_cli::{init_logging, output::print_json};
use envmatch_core::{
    generate_fingerprint, EnvmatchConfig, FileFormat, FilesystemStore, FingerprintStore,
};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "envgen")]
#[command(about = "Extract and save envelope fingerprints for reference audio files", long_about = None)]
struct Args {
    /// Directory containing the reference audio files
    audio_dir: PathBuf,

    /// Number of reference files to index
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// File name prefix of the references
    #[arg(long)]
    prefix: Option<String>,

    /// Audio file extension of the references
    #[arg(short, long)]
    extension: Option<String>,

    /// Output directory for fingerprint files
    #[arg(short, long)]
    output: Option<String>,

    /// On-disk encoding: json, bson or auto
    #[arg(short, long)]
    format: Option<FileFormat>,

    /// Path to configuration file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct IndexedEntry {
    id: String,
    audio_path: String,
    output_file: String,
    seconds: usize,
}

#[derive(Serialize)]
struct IndexReport {
    status: &'static str,
    output_dir: String,
    indexed: Vec<IndexedEntry>,
    skipped: Vec<String>,
    failed: Vec<String>,
    processing_time_seconds: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = EnvmatchConfig::load_or_default(&args.config)?;
    if let Some(count) = args.count {
        config.index.count = count;
    }
    if let Some(prefix) = &args.prefix {
        config.index.prefix = prefix.clone();
    }
    if let Some(ext) = &args.extension {
        config.index.audio_extension = ext.trim_start_matches('.').to_string();
    }
    if let Some(output) = &args.output {
        config.storage.base_directory = output.clone();
    }
    if let Some(format) = args.format {
        config.storage.format = format;
    }
    config.validate()?;

    run_envgen(&args.audio_dir, &config)
}

fn run_envgen(audio_dir: &Path, config: &EnvmatchConfig) -> Result<()> {
    if !audio_dir.is_dir() {
        anyhow::bail!("Audio directory not found: {}", audio_dir.display());
    }

    let store = FilesystemStore::new(&config.storage);
    std::fs::create_dir_all(store.base_dir()).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            store.base_dir().display()
        )
    })?;

    log::info!(
        "Building fingerprint index from {} ({} references)",
        audio_dir.display(),
        config.index.count
    );

    let start = std::time::Instant::now();

    let (present, missing): (Vec<_>, Vec<_>) = config
        .index
        .audio_paths(audio_dir)
        .into_iter()
        .partition(|(_, path)| path.is_file());

    for (_, path) in &missing {
        log::warn!("[SKIP] {} not found", path.display());
    }

    // Each reference is independent; results come back in index order
    let outcomes: Vec<(String, PathBuf, Result<(PathBuf, usize)>)> = present
        .into_par_iter()
        .map(|(id, path)| {
            let outcome = index_one(&store, &id, &path, config);
            (id, path, outcome)
        })
        .collect();

    let mut indexed = Vec::new();
    let mut failed = Vec::new();
    for (id, path, outcome) in outcomes {
        match outcome {
            Ok((output_file, seconds)) => {
                log::info!("Indexed {}: {} ({} seconds)", id, path.display(), seconds);
                indexed.push(IndexedEntry {
                    id,
                    audio_path: path.display().to_string(),
                    output_file: output_file.display().to_string(),
                    seconds,
                });
            }
            Err(e) => {
                log::warn!("Failed to index {}: {:#}", path.display(), e);
                failed.push(path.display().to_string());
            }
        }
    }

    let elapsed = start.elapsed();
    log::info!(
        "Done: {} indexed, {} skipped, {} failed in {:.2}s",
        indexed.len(),
        missing.len(),
        failed.len(),
        elapsed.as_secs_f64()
    );

    let status = if indexed.is_empty() { "empty" } else { "success" };
    print_json(&IndexReport {
        status,
        output_dir: store.base_dir().display().to_string(),
        indexed,
        skipped: missing
            .iter()
            .map(|(_, path)| path.display().to_string())
            .collect(),
        failed,
        processing_time_seconds: elapsed.as_secs_f64(),
    });

    Ok(())
}

fn index_one(
    store: &FilesystemStore,
    id: &str,
    path: &Path,
    config: &EnvmatchConfig,
) -> Result<(PathBuf, usize)> {
    let (fingerprint, metadata) = generate_fingerprint(path, id, &config.extraction)?;
    if fingerprint.is_empty() {
        log::warn!("{} is shorter than one second; its fingerprint is empty", path.display());
    }
    let output_file = store.save(&fingerprint, &metadata)?;
    Ok((output_file, fingerprint.len()))
}
