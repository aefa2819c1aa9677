//! Time Range Module
//!
//! Time windows as the host supplies them: resolved epoch-millisecond bounds
//! alongside the raw textual expressions (`"now-1h"` / `"now"`) that produced
//! them. The raw expressions are what decide cacheability - an absolute window
//! and a relative window can resolve to the same epochs but only the relative
//! one slides forward on the next refresh tick.

use chrono::Duration;
use serde::{Deserialize, Serialize};

// == Sort Order ==
/// Row ordering of a time column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Oldest row first
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    /// Newest row first
    #[serde(rename = "desc")]
    Descending,
}

// == Raw Time Range ==
/// The textual range expressions exactly as the host sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimeRange {
    /// Start expression, e.g. `"now-1h"` or an absolute date
    pub from: String,
    /// End expression, e.g. `"now"` or an absolute date
    pub to: String,
}

impl RawTimeRange {
    /// True only for an open relative window: `now-<offset>` through `now`.
    ///
    /// Absolute dates, closed relative windows (`now-2h` to `now-1h`) and
    /// malformed expressions all return false.
    pub fn is_relative_window(&self) -> bool {
        if self.to != "now" {
            return false;
        }
        matches!(relative_offset_ms(&self.from), Some(offset) if offset > 0)
    }
}

// == Time Range ==
/// A resolved time window in epoch milliseconds, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Window start (epoch ms)
    pub from: i64,
    /// Window end (epoch ms)
    pub to: i64,
    /// The textual expressions the bounds were resolved from
    pub raw: RawTimeRange,
}

impl TimeRange {
    /// Builds a range from resolved bounds and raw expressions.
    pub fn new(from: i64, to: i64, raw_from: impl Into<String>, raw_to: impl Into<String>) -> Self {
        Self {
            from,
            to,
            raw: RawTimeRange {
                from: raw_from.into(),
                to: raw_to.into(),
            },
        }
    }

    /// Window length in milliseconds.
    pub fn span_ms(&self) -> i64 {
        self.to - self.from
    }
}

// == Relative Expression Parsing ==
/// Parses a relative range expression into its offset from "now" in
/// milliseconds.
///
/// Accepted forms are `now` (offset 0) and `now-<count><unit>` with units
/// `s`, `m`, `h`, `d`, `w`. Anything else, including `now+...` and absolute
/// dates, yields None.
pub fn relative_offset_ms(expr: &str) -> Option<i64> {
    let rest = expr.strip_prefix("now")?;
    if rest.is_empty() {
        return Some(0);
    }
    let rest = rest.strip_prefix('-')?;

    let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let count: i64 = rest[..digits_end].parse().ok()?;

    let duration = match &rest[digits_end..] {
        "s" => Duration::seconds(count),
        "m" => Duration::minutes(count),
        "h" => Duration::hours(count),
        "d" => Duration::days(count),
        "w" => Duration::weeks(count),
        _ => return None,
    };
    Some(duration.num_milliseconds())
}
