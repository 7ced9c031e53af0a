//! Short-lived memoization of whole aggregation calls.
//!
//! An explicit, opt-in wrapper (not a hidden global): repeated identical
//! queries within the freshness window are served from memory instead of
//! re-fanning out to the providers.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::aggregate::{AggregateRequest, SearchAggregator};
use crate::types::{ContentMode, ProviderKey, ResultMap};

/// Default freshness window.
const DEFAULT_FRESHNESS: Duration = Duration::from_secs(600); // 10 minutes
/// Default entry capacity.
const DEFAULT_CAPACITY: usize = 64;

/// Canonical tuple of every parameter that affects an aggregation's
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    query: String,
    provider_order: Vec<ProviderKey>,
    enrich_posters: bool,
    mode: ContentMode,
    country: String,
    include_subscriptions: bool,
    max_results: usize,
}

impl CacheKey {
    fn from_request(request: &AggregateRequest) -> Self {
        Self {
            query: request.query.trim().to_string(),
            provider_order: request.provider_order.clone(),
            enrich_posters: request.enrich_posters,
            mode: request.mode,
            country: request.country.clone(),
            include_subscriptions: request.include_subscriptions,
            max_results: request.max_results,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    results: ResultMap,
    cached_at: Instant,
}

/// Memoizing wrapper around [`SearchAggregator`].
pub struct CachedSearch {
    aggregator: SearchAggregator,
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    freshness: Duration,
}

impl std::fmt::Debug for CachedSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSearch")
            .field("aggregator", &self.aggregator)
            .field("freshness", &self.freshness)
            .finish_non_exhaustive()
    }
}

impl CachedSearch {
    /// Wraps an aggregator with the default window and capacity.
    pub fn new(aggregator: SearchAggregator) -> Self {
        Self::with_freshness(aggregator, DEFAULT_FRESHNESS, DEFAULT_CAPACITY)
    }

    /// Wraps an aggregator with an explicit freshness window and entry
    /// capacity.
    pub fn with_freshness(
        aggregator: SearchAggregator,
        freshness: Duration,
        capacity: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            aggregator,
            entries: Mutex::new(LruCache::new(capacity)),
            freshness,
        }
    }

    /// Runs one aggregation, serving a fresh cached result when one exists.
    pub async fn run(&self, request: &AggregateRequest) -> ResultMap {
        let key = CacheKey::from_request(request);

        if let Some(entry) = self.entries.lock().get(&key) {
            if entry.cached_at.elapsed() < self.freshness {
                debug!("Serving '{}' from result cache", request.query);
                return entry.results.clone();
            }
        }

        let results = self.aggregator.run(request).await;
        self.entries.lock().put(
            key,
            CacheEntry {
                results: results.clone(),
                cached_at: Instant::now(),
            },
        );
        results
    }
}
