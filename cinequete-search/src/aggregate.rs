//! Aggregation orchestrator: concurrent provider fan-out with per-task
//! error isolation.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::metadata::TmdbMetadata;
use crate::paid::PaidProvider;
use crate::providers::{ArchiveProvider, OfferProvider, SearchRequest, YoutubeProvider};
use crate::types::{ContentMode, ProviderKey, ResultMap};

/// Everything one aggregation call needs from the caller.
#[derive(Debug, Clone)]
pub struct AggregateRequest {
    /// Free-text user query.
    pub query: String,
    /// Per-provider result cap.
    pub max_results: usize,
    /// Provider priority order; unknown entries are ignored.
    pub provider_order: Vec<ProviderKey>,
    /// Whether to fill missing posters/runtimes from the enrichment
    /// provider after the fan-out.
    pub enrich_posters: bool,
    /// Active content-mode filter.
    pub mode: ContentMode,
    /// Two-letter country code for paid offers.
    pub country: String,
    /// Whether subscription (flatrate) offers are wanted.
    pub include_subscriptions: bool,
}

impl AggregateRequest {
    /// A movies-mode request with defaults for everything but the query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: 20,
            provider_order: ProviderKey::default_order(),
            enrich_posters: true,
            mode: ContentMode::Movies,
            country: "FR".to_string(),
            include_subscriptions: false,
        }
    }
}

/// Fans a query out across the active providers and merges their
/// contributions into one keyed result mapping.
///
/// Provider tasks run concurrently under a bounded semaphore; a task that
/// errors (or panics) contributes an empty list for its key and never
/// taints the others. The orchestrator's own call cannot fail on a
/// provider-level fault.
#[derive(Debug)]
pub struct SearchAggregator {
    providers: Vec<Arc<dyn OfferProvider>>,
    metadata: TmdbMetadata,
    semaphore: Arc<Semaphore>,
}

impl SearchAggregator {
    /// Creates the aggregator with the full production provider set.
    pub fn new(config: &SearchConfig) -> Self {
        let client = config.http_client();
        let providers: Vec<Arc<dyn OfferProvider>> = vec![
            Arc::new(ArchiveProvider::new(client.clone())),
            Arc::new(YoutubeProvider::new(
                client.clone(),
                config.youtube_api_key.clone(),
            )),
            Arc::new(PaidProvider::with_candidate_cap(
                client.clone(),
                config.paid_candidate_cap,
            )),
        ];
        let metadata = TmdbMetadata::with_api_key(client, config.tmdb_api_key.clone());

        Self::with_providers(providers, metadata, config.max_concurrent_providers)
    }

    /// Creates an aggregator over an explicit provider set.
    pub fn with_providers(
        providers: Vec<Arc<dyn OfferProvider>>,
        metadata: TmdbMetadata,
        max_concurrent: usize,
    ) -> Self {
        Self {
            providers,
            metadata,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Runs one aggregation: fan-out, merge, optional enrichment.
    pub async fn run(&self, request: &AggregateRequest) -> ResultMap {
        let active = self.active_providers(request);

        // Every active key gets a slot up front, so a panicking task still
        // leaves an (empty) entry behind.
        let mut results: ResultMap = active
            .iter()
            .map(|provider| (provider.key(), Vec::new()))
            .collect();

        let search_request = Arc::new(SearchRequest {
            query: request.query.clone(),
            limit: request.max_results,
            mode: request.mode,
            country: request.country.clone(),
            include_subscriptions: request.include_subscriptions,
        });

        let mut tasks = JoinSet::new();
        for provider in active {
            let semaphore = Arc::clone(&self.semaphore);
            let search_request = Arc::clone(&search_request);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let key = provider.key();
                let outcome = provider.search(&search_request).await;
                (key, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, Ok(records))) => {
                    debug!("Provider {} returned {} records", key, records.len());
                    results.insert(key, records);
                }
                Ok((key, Err(e))) => {
                    warn!("Provider {} failed, contributing empty list: {}", key, e);
                    results.insert(key, Vec::new());
                }
                Err(e) => {
                    warn!("Provider task panicked: {}", e);
                }
            }
        }

        if request.enrich_posters {
            self.enrich(&mut results).await;
        }

        results
    }

    /// Intersects the requested order with the known provider set and
    /// applies the content-mode exclusion.
    fn active_providers(&self, request: &AggregateRequest) -> Vec<Arc<dyn OfferProvider>> {
        let mut seen = Vec::new();
        let mut active = Vec::new();
        for key in &request.provider_order {
            if seen.contains(key) {
                continue;
            }
            seen.push(*key);
            if request.mode == ContentMode::NonMovies && key.movie_centric() {
                continue;
            }
            if let Some(provider) = self.providers.iter().find(|p| p.key() == *key) {
                active.push(Arc::clone(provider));
            }
        }
        active
    }

    /// Sequential enrichment pass: fills posters and runtimes the
    /// originating provider left unset. Paid records carry storefront
    /// artwork semantics of their own and are skipped.
    async fn enrich(&self, results: &mut ResultMap) {
        for (key, records) in results.iter_mut() {
            if *key == ProviderKey::Paid {
                continue;
            }
            for record in records.iter_mut() {
                if record.poster_url.is_some() {
                    continue;
                }
                let enrichment = self.metadata.lookup(&record.title, record.year).await;
                if record.poster_url.is_none() {
                    record.poster_url = enrichment.poster_url;
                }
                if record.duration_minutes.is_none() {
                    record.duration_minutes = enrichment.runtime_minutes;
                }
            }
        }
    }
}
