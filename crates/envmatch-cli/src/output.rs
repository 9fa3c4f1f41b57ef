//! JSON output formatting

use envmatch_core::{MatchResult, ReferenceLayout};
use serde::Serialize;
use std::path::Path;

/// Outcome of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    NoMatch,
}

/// One reported alignment, ready for a player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutput {
    pub matched_id: String,
    /// Video a player should open
    pub video_path: String,
    /// Where to seek to (seconds)
    pub offset_seconds: usize,
    /// L1 cost, rounded to two decimals for display
    pub cost: f64,
}

/// Full report printed by `envmatcher`
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub query_path: String,
    pub query_seconds: usize,
    pub references: usize,
    pub status: MatchStatus,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub best: Option<MatchOutput>,
    pub candidates: Vec<MatchOutput>,
}

impl QueryReport {
    /// Build a report from a cost ranking (best first)
    pub fn new(
        query_path: &Path,
        query_seconds: usize,
        references: usize,
        ranking: &[MatchResult],
        top: usize,
        layout: &ReferenceLayout,
        video_dir: &Path,
    ) -> Self {
        let candidates: Vec<MatchOutput> = ranking
            .iter()
            .take(top.max(1))
            .map(|r| MatchOutput {
                matched_id: r.matched_id.clone(),
                video_path: layout.video_path(video_dir, &r.matched_id).display().to_string(),
                offset_seconds: r.offset_seconds,
                cost: round_for_display(r.cost),
            })
            .collect();

        let best = candidates.first().cloned();
        let status = if best.is_some() {
            MatchStatus::Matched
        } else {
            MatchStatus::NoMatch
        };

        Self {
            query_path: query_path.display().to_string(),
            query_seconds,
            references,
            status,
            best,
            candidates,
        }
    }
}

fn round_for_display(cost: f64) -> f64 {
    (cost * 100.0).round() / 100.0
}

/// Print any serializable report as pretty JSON
pub fn print_json<T: Serialize>(report: &T) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing report: {}", e),
    }
}
