//! Request and Response models for the query cache
//!
//! This module defines the host-facing data shapes: batched query requests,
//! time windows with their raw expressions, and the staged response payloads.

pub mod range;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use range::{relative_offset_ms, RawTimeRange, SortOrder, TimeRange};
pub use requests::{QueryKind, QueryRequest, Target};
pub use responses::{LoadingState, QueryResponse};
