//! Error types for the query cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the query cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Request failed validation before admission
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A result set could not be matched back to the request that produced it.
    /// Callers absorb this locally: a malformed response must never replace a
    /// valid cache entry.
    #[error("Malformed result set: {0}")]
    MalformedResult(String),

    /// Backend collaborator failure, passed through to the host unmodified
    #[error("Backend error: {0}")]
    Backend(String),
}

// == Result Type Alias ==
/// Convenience Result type for the query cache.
pub type Result<T> = std::result::Result<T, CacheError>;
