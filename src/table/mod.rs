//! Table Module
//!
//! Columnar row tables and the pure algorithms that stitch and clip them.

mod frame;
mod merge;
mod search;
mod trim;

// Re-export public types
pub use frame::{RowTable, ValueColumn};
pub use merge::merge_tables;
pub use search::{closest_index, end_cut, start_cut};
pub use trim::trim_table;
