//! Tailcache - an incremental query cache for sliding-window dashboards
//!
//! A dashboard asking for "the last hour" every few seconds re-fetches almost
//! entirely rows it already has. This crate caches the columnar results of
//! batched telemetry queries, narrows each refresh to the newly elapsed tail
//! of the window, and stitches cached rows onto the fresh ones before handing
//! them back.
//!
//! The moving parts: a signature builder fingerprints requests so any
//! result-affecting edit invalidates the batch; an admission decision turns a
//! lookup into either a full requery or a narrowed sub-request plus cached
//! partials; pure merge/trim engines stitch and clip time-ordered row tables;
//! and a [`runner::QueryRunner`] threads one session's caches through the
//! prepare / round-trip / complete flow.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod runner;
pub mod table;

pub use cache::{CacheStats, CacheStore, SlidingWindowCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use models::{
    LoadingState, QueryKind, QueryRequest, QueryResponse, RawTimeRange, SortOrder, Target,
    TimeRange,
};
pub use runner::{Backend, PreparedQuery, QueryOutcome, QueryRunner};
pub use table::{merge_tables, trim_table, RowTable, ValueColumn};
