//! Error types for search aggregation.
//!
//! None of these cross the orchestrator boundary: every provider-level
//! error is absorbed into an empty contribution for that provider key.

use thiserror::Error;

/// Errors that can occur inside provider adapters and the paid reconciler.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Search operation failed with the specified query and reason.
    #[error("Search failed for query '{query}': {reason}")]
    SearchFailed {
        /// The search query that failed
        query: String,
        /// The reason for the failure
        reason: String,
    },

    /// Network communication error occurred during search.
    #[error("Network error: {reason}")]
    NetworkError {
        /// The reason for the network error
        reason: String,
    },

    /// Failed to parse search results or response data.
    #[error("Parse error: {reason}")]
    ParseError {
        /// The reason for the parse error
        reason: String,
    },

    /// Provider cannot be used at all this round (missing credential or
    /// client-side prerequisite).
    #[error("Provider unavailable: {reason}")]
    ProviderUnavailable {
        /// The reason the provider is unavailable
        reason: String,
    },

    /// Hard HTTP fault from an upstream during a multi-step lookup; aborts
    /// that provider's entire contribution for the call.
    #[error("Upstream HTTP status {status}")]
    UpstreamStatus {
        /// The HTTP status code the upstream answered with
        status: u16,
    },

    /// Failed to fetch enrichment metadata for a result.
    #[error("Metadata fetch failed: {reason}")]
    MetadataFetchFailed {
        /// The reason for the metadata fetch failure
        reason: String,
    },
}
