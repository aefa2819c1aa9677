//! Target Signature Builder
//!
//! Turns one target into a stable Identity and a change-sensitive Signature,
//! and composes the per-request composite cache key.
//!
//! The Signature serializes every result-affecting field in one fixed order,
//! so the order fields arrived in (or whether an optional field was written at
//! all) can never change the string. Absent optionals serialize to JSON null;
//! a target with only required fields still yields the full fixed-length
//! array.

use serde_json::json;

use crate::models::{QueryRequest, Target};

// == Identity ==
/// Stable name for a target's screen position, independent of its parameters.
pub fn target_identity(panel_id: u64, target: &Target) -> String {
    format!("{}/{}", panel_id, target.ref_id)
}

// == Signature ==
/// Serializes every result-affecting field of a target, in fixed order.
pub fn target_signature(target: &Target) -> String {
    json!([
        target.kind,
        target.channel,
        target.aggregate,
        target.resolution,
        target.quality,
        target.max_rows,
        target.order,
    ])
    .to_string()
}

// == Composite Key ==
/// Cache key for a batched request: the raw relative `from` expression plus
/// the signatures of all targets, sorted lexicographically so target array
/// order is irrelevant.
pub fn request_cache_key(request: &QueryRequest) -> String {
    let mut signatures: Vec<String> = request.targets.iter().map(target_signature).collect();
    signatures.sort();
    format!("{}|{}", request.range.raw.from, signatures.join(";"))
}
