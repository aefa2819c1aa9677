//! Cache Entry Module
//!
//! One entry per target of a cached batched request: the target's signature at
//! the time of the write, the absolute span the cached rows cover, and the row
//! tables themselves keyed by frame identity.

use std::collections::BTreeMap;

use crate::table::RowTable;

// == Covered Range ==
/// The absolute span a cache entry's rows cover, epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoveredRange {
    /// Oldest covered instant
    pub from: i64,
    /// Newest covered instant
    pub to: i64,
}

impl CoveredRange {
    /// True when this span can seed a request starting at `new_from`: the
    /// starts are identical, or this span starts earlier and still overlaps
    /// the new start.
    pub fn covers_start(&self, new_from: i64) -> bool {
        self.from == new_from || (self.from < new_from && new_from < self.to)
    }
}

// == Target Cache Entry ==
/// Cached state for one target of one batched request.
#[derive(Debug, Clone)]
pub struct TargetCacheEntry {
    /// Stable target identity (panel position + target ref)
    pub identity: String,
    /// Signature the rows were fetched under
    pub signature: String,
    /// Span the cached rows cover
    pub range: CoveredRange,
    /// Cached row tables by frame identity
    pub frames: BTreeMap<String, RowTable>,
}

impl TargetCacheEntry {
    /// Creates an entry with no frames yet.
    pub fn new(identity: impl Into<String>, signature: impl Into<String>, range: CoveredRange) -> Self {
        Self {
            identity: identity.into(),
            signature: signature.into(),
            range,
            frames: BTreeMap::new(),
        }
    }

    /// Stores a frame under its own identity, replacing any previous frame of
    /// the same series.
    pub fn insert_frame(&mut self, table: RowTable) {
        self.frames.insert(table.frame_identity(), table);
    }

    /// Looks up the cached frame matching an incoming table's identity.
    pub fn frame_matching(&self, frame_identity: &str) -> Option<&RowTable> {
        self.frames.get(frame_identity)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ValueColumn;

    #[test]
    fn test_covers_start_identical() {
        let range = CoveredRange { from: 100, to: 200 };
        assert!(range.covers_start(100));
    }

    #[test]
    fn test_covers_start_earlier_and_overlapping() {
        let range = CoveredRange { from: 100, to: 200 };
        assert!(range.covers_start(150));
        assert!(range.covers_start(199));
    }

    #[test]
    fn test_covers_start_rejects_gap_or_late_start() {
        let range = CoveredRange { from: 100, to: 200 };
        // New window starts before the cached rows begin
        assert!(!range.covers_start(50));
        // New window starts at or past the cached end: nothing to stitch onto
        assert!(!range.covers_start(200));
        assert!(!range.covers_start(300));
    }

    #[test]
    fn test_insert_frame_replaces_same_series() {
        let mut entry =
            TargetCacheEntry::new("0/A", "sig", CoveredRange { from: 0, to: 100 });

        let mut first = RowTable::new("A").with_column(ValueColumn::new("value"));
        first.push_row(10, &[1.0]);
        let mut second = RowTable::new("A").with_column(ValueColumn::new("value"));
        second.push_row(20, &[2.0]);

        let identity = first.frame_identity();
        entry.insert_frame(first);
        entry.insert_frame(second);

        assert_eq!(entry.frames.len(), 1);
        assert_eq!(entry.frame_matching(&identity).unwrap().times, vec![20]);
    }

    #[test]
    fn test_frame_matching_distinguishes_labels() {
        let mut entry =
            TargetCacheEntry::new("0/A", "sig", CoveredRange { from: 0, to: 100 });

        let mut labels = BTreeMap::new();
        labels.insert("line".to_string(), "1".to_string());
        let labelled =
            RowTable::new("A").with_column(ValueColumn::with_labels("value", labels));
        let plain = RowTable::new("A").with_column(ValueColumn::new("value"));

        entry.insert_frame(labelled.clone());
        entry.insert_frame(plain.clone());

        assert_eq!(entry.frames.len(), 2);
        assert!(entry.frame_matching(&labelled.frame_identity()).is_some());
        assert!(entry.frame_matching(&plain.frame_identity()).is_some());
    }
}
