//! Request Models
//!
//! Defines the structure of incoming batched query requests.

use serde::{Deserialize, Serialize};

use crate::models::range::{SortOrder, TimeRange};

// == Query Kind ==
/// What a target asks the backend for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// A stream of time-ordered rows covering the visible window
    #[default]
    TimeSeries,
    /// A one-shot read of the latest value
    Snapshot,
    /// Series descriptors rather than data rows
    Metadata,
}

impl QueryKind {
    /// Time-series targets are the only ones worth re-fetching when a window
    /// slides; snapshot and metadata reads are fully satisfied by cached rows.
    pub fn is_time_series(self) -> bool {
        matches!(self, QueryKind::TimeSeries)
    }
}

// == Target ==
/// One logical query among possibly several batched in a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Panel-local reference, e.g. "A"
    pub ref_id: String,
    /// What kind of read this is
    #[serde(default)]
    pub kind: QueryKind,
    /// The telemetry series to read
    pub channel: String,
    /// Server-side aggregation, e.g. "avg"
    #[serde(default)]
    pub aggregate: Option<String>,
    /// Sample resolution, e.g. "1m"
    #[serde(default)]
    pub resolution: Option<String>,
    /// Quality filter applied by the backend
    #[serde(default)]
    pub quality: Option<String>,
    /// Row cap applied by the backend
    #[serde(default)]
    pub max_rows: Option<u64>,
    /// Opt this target (and thereby its whole request) out of caching
    #[serde(default)]
    pub cache_disabled: bool,
    /// Requested row ordering
    #[serde(default)]
    pub order: SortOrder,
}

impl Target {
    /// Creates a time-series target with only the required fields set.
    pub fn new(ref_id: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            kind: QueryKind::TimeSeries,
            channel: channel.into(),
            aggregate: None,
            resolution: None,
            quality: None,
            max_rows: None,
            cache_disabled: false,
            order: SortOrder::Ascending,
        }
    }
}

// == Query Request ==
/// A batched query over one time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Unique per refresh tick; echoed back as the response key
    pub request_id: String,
    /// Stable screen position of the issuing panel
    #[serde(default)]
    pub panel_id: u64,
    /// The visible window
    pub range: TimeRange,
    /// Sampling interval hint in milliseconds
    pub interval_ms: i64,
    /// The batched targets
    pub targets: Vec<Target>,
}

impl QueryRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.request_id.is_empty() {
            return Some("Request id cannot be empty".to_string());
        }
        if self.targets.is_empty() {
            return Some("Request must contain at least one target".to_string());
        }
        if self.targets.iter().any(|t| t.ref_id.is_empty()) {
            return Some("Target ref ids cannot be empty".to_string());
        }
        if self.range.from > self.range.to {
            return Some("Range start cannot be after range end".to_string());
        }
        None
    }
}
