//! Nearest-Index Search Module
//!
//! One binary-search primitive, parameterized by sort order, shared by the
//! merge and trim engines. Both engines reason in "storage order": for an
//! ascending table storage order is time order, for a descending table it is
//! reversed. The two cut helpers translate a time bound into a row index with
//! the off-by-one correction applied, so callers slice instead of re-deriving
//! comparator logic per direction.

use crate::models::SortOrder;

// == Closest Index ==
/// Index of the timestamp nearest to `needle`.
///
/// Ties go to the earlier index. Returns None only for an empty column.
pub fn closest_index(times: &[i64], needle: i64, order: SortOrder) -> Option<usize> {
    if times.is_empty() {
        return None;
    }

    let insertion = match order {
        SortOrder::Ascending => times.partition_point(|&t| t < needle),
        SortOrder::Descending => times.partition_point(|&t| t > needle),
    };
    if insertion == 0 {
        return Some(0);
    }
    if insertion == times.len() {
        return Some(times.len() - 1);
    }

    let distance_before = (needle - times[insertion - 1]).abs();
    let distance_after = (times[insertion] - needle).abs();
    if distance_after < distance_before {
        Some(insertion)
    } else {
        Some(insertion - 1)
    }
}

/// True when `time` sorts strictly before `bound` in storage order.
fn before(time: i64, bound: i64, order: SortOrder) -> bool {
    match order {
        SortOrder::Ascending => time < bound,
        SortOrder::Descending => time > bound,
    }
}

// == Cut Helpers ==
/// First index at or past `bound` in storage order; rows before it are the
/// ones a trim-from-the-start drops.
pub fn start_cut(times: &[i64], bound: i64, order: SortOrder) -> usize {
    match closest_index(times, bound, order) {
        Some(index) if before(times[index], bound, order) => index + 1,
        Some(index) => index,
        None => 0,
    }
}

/// One past the last index at or before `bound` in storage order; rows from it
/// on are the ones a trim-from-the-end drops.
pub fn end_cut(times: &[i64], bound: i64, order: SortOrder) -> usize {
    match closest_index(times, bound, order) {
        Some(index) if before(bound, times[index], order) => index,
        Some(index) => index + 1,
        None => 0,
    }
}
