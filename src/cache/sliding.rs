//! Sliding Window Cache Module
//!
//! The simpler, per-target companion to the relative-range store. Panels that
//! auto-refresh with absolute-looking ranges produce windows that advance
//! contiguously tick after tick; this cache tracks the last queried span and
//! signature per target, narrows the outgoing request to the newly elapsed
//! tail (plus a small overlap at the seam), and wipes itself the moment a
//! window jumps or a signature changes. No start/end split: callers get one
//! merged payload per response.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::entry::{CoveredRange, TargetCacheEntry};
use crate::cache::signature::{target_identity, target_signature};
use crate::error::{CacheError, Result};
use crate::models::QueryRequest;
use crate::table::{merge_tables, trim_table, RowTable};

// == Sliding Window Cache ==
/// Per-target cache for contiguously advancing windows.
#[derive(Debug, Default)]
pub struct SlidingWindowCache {
    /// One entry per target identity
    entries: HashMap<String, TargetCacheEntry>,
    /// Overlap (ms) re-fetched behind the previous window end
    overlap_window_ms: i64,
}

impl SlidingWindowCache {
    // == Constructor ==
    /// Creates an empty cache with the given seam overlap.
    pub fn new(overlap_window_ms: i64) -> Self {
        Self {
            entries: HashMap::new(),
            overlap_window_ms,
        }
    }

    // == Narrow ==
    /// Narrows `request` to its newly elapsed tail, if every target's window
    /// follows contiguously from the last one it queried under an unchanged
    /// signature.
    ///
    /// Any discontinuity - a fresh target, a signature change, a window jump
    /// or a rewind - wipes the stale entries and forces a full requery.
    pub fn narrow(&mut self, request: &QueryRequest) -> Option<QueryRequest> {
        if request.targets.is_empty() || request.targets.iter().any(|t| t.cache_disabled) {
            return None;
        }

        let new_from = request.range.from;
        let new_to = request.range.to;
        let mut oldest_covered_to = i64::MAX;

        for target in &request.targets {
            let identity = target_identity(request.panel_id, target);
            let covered_to = self.entries.get(&identity).and_then(|entry| {
                let contiguous = entry.signature == target_signature(target)
                    && new_to > entry.range.to
                    && new_from <= entry.range.to
                    && new_from >= entry.range.from;
                contiguous.then_some(entry.range.to)
            });
            match covered_to {
                Some(covered_to) => oldest_covered_to = oldest_covered_to.min(covered_to),
                None => {
                    debug!(
                        request_id = %request.request_id,
                        identity = %identity,
                        "window discontinuity, wiping sliding entries"
                    );
                    for target in &request.targets {
                        self.entries
                            .remove(&target_identity(request.panel_id, target));
                    }
                    return None;
                }
            }
        }

        let narrowed_from = (oldest_covered_to - self.overlap_window_ms).max(new_from);
        let mut narrowed = request.clone();
        narrowed.range.from = narrowed_from;
        debug!(
            request_id = %request.request_id,
            narrowed_from,
            "narrowing to newly elapsed tail"
        );
        Some(narrowed)
    }

    // == Write ==
    /// Folds a terminal response into the cache under the request's full
    /// window and returns the merged frames to publish.
    ///
    /// Same merge+trim treatment as the relative-range store, same
    /// malformed-response rule: an unattributable table aborts the write
    /// without mutating anything.
    pub fn write(&mut self, request: &QueryRequest, data: &[RowTable]) -> Result<Vec<RowTable>> {
        let mut by_ref: HashMap<&str, Vec<&RowTable>> = HashMap::new();
        for table in data {
            let ref_id = table.ref_id.as_deref().ok_or_else(|| {
                CacheError::MalformedResult("row table missing target attribution".to_string())
            })?;
            if !request.targets.iter().any(|t| t.ref_id == ref_id) {
                return Err(CacheError::MalformedResult(format!(
                    "row table references unknown target '{}'",
                    ref_id
                )));
            }
            by_ref.entry(ref_id).or_default().push(table);
        }

        let cacheable = !request.targets.iter().any(|t| t.cache_disabled);
        let range = CoveredRange {
            from: request.range.from,
            to: request.range.to,
        };
        let mut published = Vec::new();

        for target in &request.targets {
            let identity = target_identity(request.panel_id, target);
            let signature = target_signature(target);
            let prior = self
                .entries
                .get(&identity)
                .filter(|e| e.signature == signature);
            let mut entry = TargetCacheEntry::new(identity.clone(), signature, range);

            let Some(tables) = by_ref.get(target.ref_id.as_str()) else {
                // Nothing fresh for this target: keep whatever was cached,
                // clipped to the window it now claims to cover.
                if let Some(prior) = prior {
                    for frame in prior.frames.values() {
                        let kept = trim_table(frame, range.from, range.to, target.order);
                        published.push(kept.clone());
                        if !kept.is_empty() {
                            entry.insert_frame(kept);
                        }
                    }
                }
                if cacheable {
                    self.entries.insert(identity, entry);
                }
                continue;
            };

            for table in tables {
                let cached = prior.and_then(|e| e.frame_matching(&table.frame_identity()));
                let merged = match cached {
                    Some(cached) => merge_tables(cached, table, target.order),
                    None => (*table).clone(),
                };
                let folded = trim_table(&merged, range.from, range.to, target.order);
                published.push(folded.clone());
                if !folded.is_empty() {
                    entry.insert_frame(folded);
                }
            }
            if cacheable {
                self.entries.insert(identity, entry);
            }
        }

        Ok(published)
    }

    // == Length ==
    /// Number of tracked targets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
