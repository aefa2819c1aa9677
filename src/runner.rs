//! Response Assembly Module
//!
//! Ties the pieces together: admission narrows an incoming request against
//! the caches, the backend round trip happens through the [`Backend`] seam,
//! and terminal responses are folded back into the caches before being
//! republished to the host.
//!
//! The flow is split in two so the host can deliver cached rows before the
//! network answers: [`QueryRunner::prepare`] is synchronous and yields the
//! immediately-available payload plus the request actually worth sending;
//! [`QueryRunner::complete`] folds the backend's answer back in. A
//! `PreparedQuery` that is dropped without completing mutates nothing, which
//! is exactly the cancellation rule: only terminal responses write.

use async_trait::async_trait;
use tracing::debug;

use crate::cache::{
    is_cacheable_range, CacheLookup, CachedPartials, CacheStats, CacheStore, SlidingWindowCache,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{QueryRequest, QueryResponse};
use crate::table::RowTable;

// == Backend Seam ==
/// The single collaborator this crate calls out to.
#[async_trait]
pub trait Backend {
    /// Executes one (possibly narrowed) request against the data service.
    async fn send(&self, request: QueryRequest) -> Result<QueryResponse>;
}

#[async_trait]
impl<B: Backend + Send + Sync + ?Sized> Backend for std::sync::Arc<B> {
    async fn send(&self, request: QueryRequest) -> Result<QueryResponse> {
        (**self).send(request).await
    }
}

// == Cache Path ==
/// Which cache a request was admitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CachePath {
    /// Open relative window: the relative-range store
    Relative,
    /// Everything else: the per-target sliding cache
    Sliding,
    /// A target opted out: no cache reads or writes at all
    Bypass,
}

// == Prepared Query ==
/// The outcome of admission, held by the host across the backend round trip.
#[derive(Debug)]
pub struct PreparedQuery {
    original: QueryRequest,
    outgoing: QueryRequest,
    path: CachePath,
    cached_start: Vec<RowTable>,
    cached_end: Vec<RowTable>,
}

impl PreparedQuery {
    /// The request to actually send: narrowed on a hit, untouched on a miss.
    pub fn request(&self) -> &QueryRequest {
        &self.outgoing
    }

    /// True when admission shrank the window or dropped one-shot targets.
    pub fn is_narrowed(&self) -> bool {
        self.outgoing.range.from != self.original.range.from
            || self.outgoing.targets.len() != self.original.targets.len()
    }

    /// True when nothing is left to send; every target was satisfied from
    /// cache.
    pub fn is_fully_cached(&self) -> bool {
        self.outgoing.targets.is_empty()
    }

    /// Cached rows that belong ahead of the fresh tail.
    pub fn cached_start(&self) -> &[RowTable] {
        &self.cached_start
    }

    /// Cached rows (descending targets only) that belong after the fresh
    /// tail, so the delivered order stays `start ++ fresh ++ end`.
    pub fn cached_end(&self) -> &[RowTable] {
        &self.cached_end
    }

    /// The streaming payload to deliver before the round trip, if any rows
    /// are already in hand.
    pub fn initial_response(&self) -> Option<QueryResponse> {
        if self.cached_start.is_empty() {
            None
        } else {
            Some(QueryResponse::streaming(
                self.original.request_id.clone(),
                self.cached_start.clone(),
            ))
        }
    }
}

// == Query Outcome ==
/// Everything one `query` call produced, in delivery order.
#[derive(Debug)]
pub struct QueryOutcome {
    /// The immediate streaming payload, when cached rows were in hand
    pub initial: Option<QueryResponse>,
    /// The terminal payload
    pub response: QueryResponse,
}

// == Query Runner ==
/// Owns the session's caches and drives requests through them.
///
/// One runner per session; the caches live nowhere else. The runner itself
/// never spawns or locks anything - overlapping refresh ticks are the host's
/// business (prepare both, complete in arrival order, last terminal response
/// wins the cache entry).
pub struct QueryRunner<B> {
    backend: B,
    store: CacheStore,
    sliding: SlidingWindowCache,
    refresh_margin_ms: i64,
}

impl<B: Backend> QueryRunner<B> {
    // == Constructor ==
    /// Creates a runner with caches sized from `config`.
    pub fn new(backend: B, config: &Config) -> Self {
        Self {
            backend,
            store: CacheStore::new(config.refresh_margin_ms, config.max_cached_requests),
            sliding: SlidingWindowCache::new(config.overlap_window_ms),
            refresh_margin_ms: config.refresh_margin_ms,
        }
    }

    // == Prepare ==
    /// Runs admission for `request` and returns what to send plus the cached
    /// rows already in hand.
    pub fn prepare(&mut self, request: QueryRequest) -> Result<PreparedQuery> {
        if let Some(message) = request.validate() {
            return Err(CacheError::InvalidRequest(message));
        }

        if request.targets.iter().any(|t| t.cache_disabled) {
            debug!(request_id = %request.request_id, "caching disabled by target");
            return Ok(PreparedQuery {
                outgoing: request.clone(),
                original: request,
                path: CachePath::Bypass,
                cached_start: Vec::new(),
                cached_end: Vec::new(),
            });
        }

        if is_cacheable_range(&request.range, self.refresh_margin_ms) {
            let (outgoing, cached_start, cached_end) = match self.store.lookup(&request) {
                CacheLookup::Hit(partials) => {
                    let CachedPartials {
                        sub_request,
                        cached_start,
                        cached_end,
                    } = *partials;
                    (sub_request, cached_start, cached_end)
                }
                CacheLookup::Miss => (request.clone(), Vec::new(), Vec::new()),
            };
            return Ok(PreparedQuery {
                outgoing,
                original: request,
                path: CachePath::Relative,
                cached_start,
                cached_end,
            });
        }

        let outgoing = self.sliding.narrow(&request).unwrap_or_else(|| request.clone());
        Ok(PreparedQuery {
            outgoing,
            original: request,
            path: CachePath::Sliding,
            cached_start: Vec::new(),
            cached_end: Vec::new(),
        })
    }

    // == Complete ==
    /// Folds a backend response into the caches and returns the payload to
    /// hand to the host.
    ///
    /// Non-terminal responses pass straight through. A malformed terminal
    /// response is absorbed: the caches keep their previous - stale but
    /// correct - entries and the response passes through unmodified. Published
    /// rows are copies owned by the caller; mutating them cannot reach the
    /// cache.
    pub fn complete(&mut self, prepared: PreparedQuery, response: QueryResponse) -> QueryResponse {
        if !response.is_terminal() {
            return response;
        }

        let written = match prepared.path {
            CachePath::Bypass => return response,
            CachePath::Relative => self.store.write(&prepared.original, &response.data),
            CachePath::Sliding => self.sliding.write(&prepared.original, &response.data),
        };

        match written {
            Ok(published) => QueryResponse::done(prepared.original.request_id.clone(), published),
            Err(error) => {
                debug!(
                    request_id = %prepared.original.request_id,
                    %error,
                    "terminal response not cached"
                );
                response
            }
        }
    }

    // == Query ==
    /// Prepare, backend round trip, and complete in one call.
    ///
    /// Skips the round trip entirely when admission satisfied every target
    /// from cache. Backend errors propagate unmodified.
    pub async fn query(&mut self, request: QueryRequest) -> Result<QueryOutcome> {
        let prepared = self.prepare(request)?;
        let initial = prepared.initial_response();

        let response = if prepared.is_fully_cached() {
            QueryResponse::done(prepared.original.request_id.clone(), Vec::new())
        } else {
            self.backend.send(prepared.request().clone()).await?
        };

        let response = self.complete(prepared, response);
        Ok(QueryOutcome { initial, response })
    }

    // == Stats ==
    /// Admission statistics of the relative-range store.
    pub fn cache_stats(&self) -> CacheStats {
        self.store.stats()
    }
}
