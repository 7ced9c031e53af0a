//! Centralized configuration for search aggregation.
//!
//! All tunable parameters live here to avoid hard-coded values scattered
//! through the adapters.

use std::time::Duration;

/// Configuration for the aggregator and its provider adapters.
///
/// Credentials are optional: a provider whose key is absent contributes an
/// empty result list instead of failing the query.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// YouTube Data API key; `None` disables the video provider.
    pub youtube_api_key: Option<String>,
    /// TMDB API key; `None` disables poster/runtime enrichment.
    pub tmdb_api_key: Option<String>,
    /// Per-request HTTP timeout applied to every provider call.
    pub http_timeout: Duration,
    /// Upper bound on simultaneously in-flight provider tasks.
    pub max_concurrent_providers: usize,
    /// Candidate titles considered per query by the paid reconciler.
    pub paid_candidate_cap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            tmdb_api_key: None,
            http_timeout: Duration::from_secs(15), // one slow provider must not starve the rest
            max_concurrent_providers: 8,
            paid_candidate_cap: 8,
        }
    }
}

impl SearchConfig {
    /// Reads credentials from `YOUTUBE_API_KEY` and `TMDB_API_KEY`,
    /// keeping defaults for everything else.
    pub fn from_env() -> Self {
        Self {
            youtube_api_key: std::env::var("YOUTUBE_API_KEY").ok(),
            tmdb_api_key: std::env::var("TMDB_API_KEY").ok(),
            ..Self::default()
        }
    }

    /// Builds the shared HTTP client with the configured per-request
    /// timeout.
    pub fn http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.max_concurrent_providers, 8);
        assert_eq!(config.paid_candidate_cap, 8);
        assert!(config.youtube_api_key.is_none());
        assert!(config.http_timeout >= Duration::from_secs(10));
        assert!(config.http_timeout <= Duration::from_secs(20));
    }
}
