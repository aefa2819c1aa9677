//! Cache Store Module
//!
//! The relative-range cache: one entry list per composite request key,
//! replaced wholesale on every terminal response, narrowed on lookup to the
//! minimal backend sub-request. The store is a plain owned object - whoever
//! handles requests owns one per session and threads it through; nothing here
//! is global.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::admission::{is_cacheable_request, CacheLookup, CachedPartials};
use crate::cache::entry::{CoveredRange, TargetCacheEntry};
use crate::cache::keys::KeyTracker;
use crate::cache::signature::{request_cache_key, target_identity, target_signature};
use crate::cache::stats::CacheStats;
use crate::error::{CacheError, Result};
use crate::models::{QueryRequest, SortOrder};
use crate::table::{end_cut, merge_tables, start_cut, trim_table, RowTable};

// == Cache Store ==
/// Relative-range cache for batched telemetry requests.
#[derive(Debug)]
pub struct CacheStore {
    /// Target entries per composite request key
    entries: HashMap<String, Vec<TargetCacheEntry>>,
    /// Access order for capacity eviction
    keys: KeyTracker,
    /// Admission statistics
    stats: CacheStats,
    /// Trailing duration (ms) always re-fetched rather than served from cache
    refresh_margin_ms: i64,
    /// Maximum number of composite keys held
    max_requests: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store with the given refresh margin and capacity bound.
    pub fn new(refresh_margin_ms: i64, max_requests: usize) -> Self {
        Self {
            entries: HashMap::new(),
            keys: KeyTracker::new(),
            stats: CacheStats::new(),
            refresh_margin_ms,
            max_requests,
        }
    }

    // == Lookup ==
    /// Decides whether `request` can be partially served from cache.
    ///
    /// On a hit the result carries the narrowed sub-request (same `to`, `from`
    /// moved up to the refresh boundary, one-shot targets dropped) and the
    /// cached rows that belong before and after the fresh tail. Everything
    /// else is a miss: non-cacheable ranges, unknown keys, a signature change
    /// on any single target, or a cached span that cannot seed the new start.
    pub fn lookup(&mut self, request: &QueryRequest) -> CacheLookup {
        if request.targets.is_empty() {
            self.stats.record_miss();
            return CacheLookup::Miss;
        }
        if !is_cacheable_request(request, self.refresh_margin_ms) {
            debug!(request_id = %request.request_id, "request not cacheable");
            self.stats.record_miss();
            return CacheLookup::Miss;
        }

        let key = request_cache_key(request);
        let Some(entries) = self.entries.get(&key) else {
            debug!(request_id = %request.request_id, "cache miss");
            self.stats.record_miss();
            return CacheLookup::Miss;
        };

        // Every target must still match its cached signature; one change
        // invalidates the whole batch.
        let mut matched = Vec::with_capacity(request.targets.len());
        for target in &request.targets {
            let identity = target_identity(request.panel_id, target);
            match entries.iter().find(|e| e.identity == identity) {
                Some(entry) if entry.signature == target_signature(target) => matched.push(entry),
                _ => {
                    debug!(
                        request_id = %request.request_id,
                        identity = %identity,
                        "signature mismatch, forcing full requery"
                    );
                    self.stats.record_miss();
                    return CacheLookup::Miss;
                }
            }
        }

        // Entries of one batch are written together and share their range
        let covered = matched[0].range;
        if !covered.covers_start(request.range.from) {
            debug!(
                request_id = %request.request_id,
                cached_from = covered.from,
                cached_to = covered.to,
                new_from = request.range.from,
                "cached span cannot seed request"
            );
            self.stats.record_miss();
            return CacheLookup::Miss;
        }

        let refresh_from = covered.to.min(request.range.to - self.refresh_margin_ms);

        let mut cached_start = Vec::new();
        let mut cached_end = Vec::new();
        for (target, entry) in request.targets.iter().zip(&matched) {
            for frame in entry.frames.values() {
                if !target.kind.is_time_series() {
                    // One-shot reads are fully satisfied from cache
                    cached_start.push(frame.clone());
                    continue;
                }
                match target.order {
                    SortOrder::Ascending => {
                        let cut = start_cut(&frame.times, refresh_from, SortOrder::Ascending);
                        cached_start.push(frame.slice_rows(0..cut));
                    }
                    SortOrder::Descending => {
                        // Rows older than the boundary trail the fresh tail
                        let cut = end_cut(&frame.times, refresh_from, SortOrder::Descending);
                        cached_end.push(frame.slice_rows(cut..frame.len()));
                    }
                }
            }
        }

        let mut sub_request = request.clone();
        sub_request.range.from = refresh_from;
        sub_request.targets.retain(|t| t.kind.is_time_series());

        self.keys.touch(&key);
        self.stats.record_hit();
        debug!(
            request_id = %request.request_id,
            refresh_from,
            start_frames = cached_start.len(),
            end_frames = cached_end.len(),
            "serving partial rows from cache"
        );
        CacheLookup::Hit(Box::new(CachedPartials {
            sub_request,
            cached_start,
            cached_end,
        }))
    }

    // == Write ==
    /// Folds a terminal response into the store and returns the frames to
    /// publish to the caller.
    ///
    /// Incoming tables merge into their cached frames by frame identity, get
    /// trimmed to the visible window, and replace the prior entry wholesale.
    /// Published frames are independent copies, so callers mutating them in
    /// place cannot corrupt the store. Zero-length post-trim frames are
    /// dropped from the store but still published once, as the explicit empty
    /// result for their target.
    ///
    /// Returns `MalformedResult` - without touching the store - when a table
    /// carries no target attribution or references a target the request does
    /// not contain.
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

        let cacheable = is_cacheable_request(request, self.refresh_margin_ms);
        let key = request_cache_key(request);
        let prior = if cacheable {
            self.entries.remove(&key).unwrap_or_default()
        } else {
            Vec::new()
        };

        let range = CoveredRange {
            from: request.range.from,
            to: request.range.to,
        };
        let mut replacement = Vec::with_capacity(request.targets.len());
        let mut published = Vec::new();

        for target in &request.targets {
            let identity = target_identity(request.panel_id, target);
            let signature = target_signature(target);
            let prior_entry = prior
                .iter()
                .find(|e| e.identity == identity && e.signature == signature);
            let mut entry = TargetCacheEntry::new(identity, signature, range);

            match by_ref.get(target.ref_id.as_str()) {
                Some(tables) => {
                    for table in tables {
                        let cached = prior_entry
                            .and_then(|e| e.frame_matching(&table.frame_identity()));
                        let merged = match cached {
                            Some(cached) => merge_tables(cached, table, target.order),
                            None => (*table).clone(),
                        };
                        let folded = if target.kind.is_time_series() {
                            trim_table(&merged, range.from, range.to, target.order)
                        } else {
                            merged
                        };
                        published.push(folded.clone());
                        if !folded.is_empty() {
                            entry.insert_frame(folded);
                        }
                    }
                }
                None => {
                    // No fresh rows for this target - one-shot targets are
                    // dropped from narrowed sub-requests - so its cached
                    // frames carry forward.
                    if let Some(prior_entry) = prior_entry {
                        for frame in prior_entry.frames.values() {
                            let kept = if target.kind.is_time_series() {
                                trim_table(frame, range.from, range.to, target.order)
                            } else {
                                frame.clone()
                            };
                            published.push(kept.clone());
                            if !kept.is_empty() {
                                entry.insert_frame(kept);
                            }
                        }
                    }
                }
            }
            replacement.push(entry);
        }

        if cacheable {
            self.entries.insert(key.clone(), replacement);
            self.keys.touch(&key);
            while self.entries.len() > self.max_requests {
                match self.keys.evict_oldest() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                        self.stats.record_eviction();
                    }
                    None => break,
                }
            }
            self.stats.set_total_entries(self.entries.len());
            debug!(request_id = %request.request_id, total = self.entries.len(), "cache entry written");
        }

        Ok(published)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Number of cached batched requests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
