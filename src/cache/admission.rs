//! Admission Module
//!
//! Decides whether a request may touch the relative-range cache at all, and
//! carries the outcome of a store lookup: either a plain miss or the narrowed
//! sub-request plus the cached partial rows that go around the fresh tail.

use crate::models::{QueryRequest, TimeRange};
use crate::table::RowTable;

// == Cacheability ==
/// A range is cacheable only as an open relative window whose span exceeds
/// the refresh margin: the trailing margin is always re-fetched, so a window
/// no longer than the margin gains nothing from caching.
pub fn is_cacheable_range(range: &TimeRange, refresh_margin_ms: i64) -> bool {
    range.raw.is_relative_window() && range.to - refresh_margin_ms > range.from
}

/// A request is cacheable when its range is and no target opted out.
pub fn is_cacheable_request(request: &QueryRequest, refresh_margin_ms: i64) -> bool {
    !request.targets.iter().any(|t| t.cache_disabled)
        && is_cacheable_range(&request.range, refresh_margin_ms)
}

// == Lookup Outcome ==
/// Cached rows surrounding a narrowed sub-request.
#[derive(Debug, Clone)]
pub struct CachedPartials {
    /// What to actually send: same `to`, `from` moved up to the refresh
    /// boundary, one-shot targets dropped
    pub sub_request: QueryRequest,
    /// Cached rows strictly before the refresh boundary; delivered to the
    /// host ahead of the fresh tail
    pub cached_start: Vec<RowTable>,
    /// Cached rows older than the refresh boundary for descending targets;
    /// appended after the fresh tail so descending order survives
    pub cached_end: Vec<RowTable>,
}

/// Result of asking the store about a request.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// Send the full request; nothing usable was cached
    Miss,
    /// Send the narrowed sub-request and wrap the fresh tail in the partials
    Hit(Box<CachedPartials>),
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Target;

    const MARGIN: i64 = 15 * 60 * 1000;

    fn relative_range(span_ms: i64) -> TimeRange {
        TimeRange::new(1_000_000 - span_ms, 1_000_000, "now-1h", "now")
    }

    #[test]
    fn test_absolute_range_not_cacheable() {
        let range = TimeRange::new(0, 86_400_000, "2024-01-01", "2024-01-02");
        assert!(!is_cacheable_range(&range, MARGIN));
    }

    #[test]
    fn test_short_relative_range_not_cacheable() {
        // 10 minutes is inside the 15 minute refresh margin
        let range = TimeRange::new(400_000, 1_000_000, "now-10m", "now");
        assert!(!is_cacheable_range(&range, MARGIN));
    }

    #[test]
    fn test_margin_boundary_not_cacheable() {
        // Span exactly equal to the margin still fails `to - margin > from`
        let range = TimeRange::new(1_000_000 - MARGIN, 1_000_000, "now-15m", "now");
        assert!(!is_cacheable_range(&range, MARGIN));
    }

    #[test]
    fn test_hour_window_cacheable() {
        let range = TimeRange::new(1_000_000 - 3_600_000, 1_000_000, "now-1h", "now");
        assert!(is_cacheable_range(&range, MARGIN));
    }

    #[test]
    fn test_cache_disabled_target_blocks_request() {
        let mut disabled = Target::new("B", "c2");
        disabled.cache_disabled = true;
        let request = QueryRequest {
            request_id: "r1".to_string(),
            panel_id: 0,
            range: relative_range(3_600_000),
            interval_ms: 1000,
            targets: vec![Target::new("A", "c1"), disabled],
        };
        assert!(!is_cacheable_request(&request, MARGIN));
    }
}
