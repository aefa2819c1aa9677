//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

use chrono::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Trailing duration (ms) that is always re-fetched instead of served from cache
    pub refresh_margin_ms: i64,
    /// Overlap (ms) re-fetched at the seam when a contiguous window advances
    pub overlap_window_ms: i64,
    /// Maximum number of batched requests the relative-range store keeps
    pub max_cached_requests: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REFRESH_MARGIN_MS` - Refresh margin in milliseconds (default: 15 minutes)
    /// - `OVERLAP_WINDOW_MS` - Seam overlap in milliseconds (default: 1 minute)
    /// - `MAX_CACHED_REQUESTS` - Composite keys kept before eviction (default: 64)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            refresh_margin_ms: env::var("REFRESH_MARGIN_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_margin_ms),
            overlap_window_ms: env::var("OVERLAP_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.overlap_window_ms),
            max_cached_requests: env::var("MAX_CACHED_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_cached_requests),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_margin_ms: Duration::minutes(15).num_milliseconds(),
            overlap_window_ms: Duration::minutes(1).num_milliseconds(),
            max_cached_requests: 64,
        }
    }
}
