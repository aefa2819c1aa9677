//! Table Trim Engine
//!
//! Clips a row table to a closed time interval. Like the merge engine this is
//! a pure function over the shared nearest-index primitive; the only
//! direction-specific logic is which interval end maps to which end of the
//! stored rows.

use crate::models::SortOrder;
use crate::table::frame::RowTable;
use crate::table::search::{end_cut, start_cut};

// == Trim ==
/// Clips `table` to `[from, to]`, inclusive on both ends.
///
/// A table already fully inside the bounds comes back unchanged; a table
/// fully outside comes back zero-length but with its column names and labels
/// intact. Rows are cut identically across the time column and every value
/// column.
pub fn trim_table(table: &RowTable, from: i64, to: i64, order: SortOrder) -> RowTable {
    if table.is_empty() {
        return table.clone();
    }

    // In descending storage the newest bound is hit first
    let (start_bound, end_bound) = match order {
        SortOrder::Ascending => (from, to),
        SortOrder::Descending => (to, from),
    };

    let start = start_cut(&table.times, start_bound, order);
    let end = end_cut(&table.times, end_bound, order);

    if start >= end {
        return table.cleared();
    }
    if start == 0 && end == table.len() {
        return table.clone();
    }
    table.slice_rows(start..end)
}
