//! Sliding-window envelope matching
//!
//! The query envelope is slid over every reference envelope one second at a
//! time and scored by L1 distance. The global minimum wins; ties go to the
//! reference earlier in collection order, then to the smaller offset.
//!
//! Envelopes hold values with one decimal place, so scoring runs on integer
//! tenths. This keeps equal costs exactly equal (silent stretches tie a lot)
//! instead of depending on the summation order of binary floats. Envelopes
//! with values off that grid are rejected rather than rounded.

use crate::collection::FingerprintCollection;
use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Best alignment of a query against the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Id of the winning reference
    pub matched_id: String,
    /// Start of the match within the reference (seconds)
    pub offset_seconds: usize,
    /// Summed absolute amplitude difference over the query length
    pub cost: f64,
}

/// Best window of one query inside one reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub offset: usize,
    /// L1 cost in tenths of amplitude
    pub cost_tenths: u64,
}

impl Alignment {
    pub fn cost(&self) -> f64 {
        self.cost_tenths as f64 / 10.0
    }
}

/// Matcher over a borrowed, already loaded collection
pub struct Matcher<'a> {
    collection: &'a FingerprintCollection,
    /// Quantized reference envelopes, parallel to `collection` order
    references: Vec<Vec<u32>>,
}

impl<'a> Matcher<'a> {
    /// Fails with `InvalidInput` if a reference holds a value that is not a
    /// non-negative multiple of 0.1.
    pub fn new(collection: &'a FingerprintCollection) -> Result<Self> {
        let references = collection
            .iter()
            .map(Fingerprint::quantize)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            collection,
            references,
        })
    }

    /// Find the single best (reference, offset) for `query`.
    ///
    /// Returns `Ok(None)` when no reference is at least as long as the query,
    /// including the empty collection.
    pub fn find_best(&self, query: &Fingerprint) -> Result<Option<MatchResult>> {
        let alignments = self.align_all(query)?;

        let best = alignments
            .iter()
            .enumerate()
            .filter_map(|(idx, a)| a.map(|a| (idx, a)))
            .min_by_key(|(_, a)| a.cost_tenths);

        let result = best.map(|(idx, a)| self.to_result(idx, a));

        match &result {
            Some(r) => log::debug!(
                "Query '{}' ({}s): best {} @ {}s, cost {:.1}",
                query.id,
                query.len(),
                r.matched_id,
                r.offset_seconds,
                r.cost
            ),
            None => log::debug!(
                "Query '{}' ({}s): no reference long enough among {}",
                query.id,
                query.len(),
                self.collection.len()
            ),
        }

        Ok(result)
    }

    /// Best alignment per reference, ordered by cost then collection order.
    ///
    /// References shorter than the query are left out. The head of the
    /// ranking is the result of [`Matcher::find_best`].
    pub fn rank(&self, query: &Fingerprint) -> Result<Vec<MatchResult>> {
        let alignments = self.align_all(query)?;

        let mut ranked: Vec<(usize, Alignment)> = alignments
            .into_iter()
            .enumerate()
            .filter_map(|(idx, a)| a.map(|a| (idx, a)))
            .collect();

        // Stable: equal costs keep collection order
        ranked.sort_by_key(|(_, a)| a.cost_tenths);

        Ok(ranked
            .into_iter()
            .map(|(idx, a)| self.to_result(idx, a))
            .collect())
    }

    fn align_all(&self, query: &Fingerprint) -> Result<Vec<Option<Alignment>>> {
        if query.is_empty() {
            return Err(Error::InvalidInput(format!(
                "query '{}' has an empty envelope",
                query.id
            )));
        }

        let q = query.quantize()?;

        // Indexed collect keeps collection order
        let alignments: Vec<Option<Alignment>> = self
            .references
            .par_iter()
            .map(|reference| best_alignment(&q, reference))
            .collect();

        for (fp, a) in self.collection.iter().zip(&alignments) {
            match a {
                Some(a) => log::trace!(
                    "  {}: offset {}s, cost {:.1}",
                    fp.id,
                    a.offset,
                    a.cost()
                ),
                None => log::trace!(
                    "  {}: skipped ({}s shorter than query {}s)",
                    fp.id,
                    fp.len(),
                    q.len()
                ),
            }
        }

        Ok(alignments)
    }

    fn to_result(&self, idx: usize, alignment: Alignment) -> MatchResult {
        MatchResult {
            matched_id: self.collection.as_slice()[idx].id.clone(),
            offset_seconds: alignment.offset,
            cost: alignment.cost(),
        }
    }
}

/// Slide `query` over `reference` (both in tenths) and return the window with
/// the lowest L1 cost, the smallest offset on ties.
///
/// `None` if the reference is shorter than the query or the query is empty.
pub fn best_alignment(query: &[u32], reference: &[u32]) -> Option<Alignment> {
    if query.is_empty() || reference.len() < query.len() {
        return None;
    }

    let max_offset = reference.len() - query.len();
    let mut best: Option<Alignment> = None;

    for offset in 0..=max_offset {
        let bound = best.map(|b| b.cost_tenths);
        if let Some(cost_tenths) = window_cost(query, &reference[offset..], bound) {
            best = Some(Alignment {
                offset,
                cost_tenths,
            });
        }
    }

    best
}

/// L1 cost of `query` against the start of `window`.
///
/// Gives up with `None` as soon as the running sum reaches `bound`, since a
/// window only replaces the current best when strictly cheaper.
fn window_cost(query: &[u32], window: &[u32], bound: Option<u64>) -> Option<u64> {
    let mut sum = 0u64;
    for (q, r) in query.iter().zip(window) {
        sum += q.abs_diff(*r) as u64;
        if bound.is_some_and(|b| sum >= b) {
            return None;
        }
    }
    Some(sum)
}
