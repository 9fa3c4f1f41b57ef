//! envmatcher - Locate a query clip in the reference index
//!
//! Usage:
//!   envmatcher <query_audio>                       # uses config.toml if present
//!   envmatcher --db ./fingerprints <query_audio>   # explicit index directory
//!
//! Prints the matched video path and the second to seek to as JSON. A query
//! longer than every reference is reported as `"status": "no_match"`.

use anyhow::Result;
use clap::Parser;
use envmatch_cli::{init_logging, output::print_json, output::QueryReport};
use envmatch_core::{generate_fingerprint, EnvmatchConfig, FilesystemStore, FingerprintStore, Matcher};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "envmatcher")]
#[command(about = "Match a query clip against the envelope fingerprint index", long_about = None)]
struct Args {
    /// Query audio clip (or a video with an audio track)
    query_audio: PathBuf,

    /// Fingerprint directory (overrides config)
    #[arg(short, long)]
    db: Option<String>,

    /// Directory holding the reference videos
    #[arg(long, default_value = ".")]
    video_dir: PathBuf,

    /// Number of ranked candidates to report
    #[arg(short, long, default_value_t = 5)]
    top: usize,

    /// Path to configuration file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = EnvmatchConfig::load_or_default(&args.config)?;
    if let Some(db) = &args.db {
        config.storage.base_directory = db.clone();
    }
    config.validate()?;

    run_envmatcher(&args.query_audio, &args.video_dir, args.top, &config)
}

fn run_envmatcher(query_path: &Path, video_dir: &Path, top: usize, config: &EnvmatchConfig) -> Result<()> {
    if !query_path.exists() {
        anyhow::bail!("Query file not found: {}", query_path.display());
    }

    let store = FilesystemStore::new(&config.storage);

    let load_start = std::time::Instant::now();
    let collection = store.load_all().map_err(|e| {
        anyhow::anyhow!("{} (run envgen to build the index first)", e)
    })?;
    log::info!(
        "Loaded {} reference fingerprints in {:.2}s",
        collection.len(),
        load_start.elapsed().as_secs_f64()
    );

    log::info!("Extracting query fingerprint from {}", query_path.display());
    let query_id = query_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("query");
    let (query, _) = generate_fingerprint(query_path, query_id, &config.extraction)?;
    log::info!("Query length: {} second(s)", query.len());

    let match_start = std::time::Instant::now();
    let matcher = Matcher::new(&collection)?;
    let ranking = matcher.rank(&query)?;
    log::info!(
        "Matching completed in {:.3}s, {} candidate(s)",
        match_start.elapsed().as_secs_f64(),
        ranking.len()
    );

    match ranking.first() {
        Some(best) => log::info!(
            "Match: {} at {}s (L1 cost {:.2})",
            best.matched_id,
            best.offset_seconds,
            best.cost
        ),
        None => log::info!("No reference is as long as the query"),
    }

    let report = QueryReport::new(
        query_path,
        query.len(),
        collection.len(),
        &ranking,
        top,
        &config.index,
        video_dir,
    );
    print_json(&report);

    Ok(())
}
