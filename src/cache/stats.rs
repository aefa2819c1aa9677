//! Cache Statistics Module
//!
//! Tracks admission outcomes: served-from-cache hits, full requeries, and
//! capacity evictions.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing how well the cache is doing its job.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that produced a narrowed sub-request plus cached partials
    pub hits: u64,
    /// Lookups that fell through to a full requery
    pub misses: u64,
    /// Entries evicted to stay under the capacity bound
    pub evictions: u64,
    /// Current number of cached batched requests
    pub total_entries: usize,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of lookups served partially from cache, 0.0 with no traffic.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Updates the entry count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
