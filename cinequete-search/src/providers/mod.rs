//! Provider implementations for offer search.

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::{ContentMode, OfferRecord, ProviderKey};

pub mod archive;
pub mod mock;
pub mod youtube;

pub use archive::ArchiveProvider;
#[cfg(test)]
pub use mock::MockProvider;
pub use youtube::YoutubeProvider;

/// Arguments shared by every provider dispatch. Each adapter reads only the
/// fields relevant to its kind (content mode for the archive, country and
/// subscription flag for the paid reconciler).
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Free-text user query.
    pub query: String,
    /// Per-provider result cap.
    pub limit: usize,
    /// Active content-mode filter.
    pub mode: ContentMode,
    /// Two-letter country code for paid offers.
    pub country: String,
    /// Whether subscription (flatrate) offers are wanted.
    pub include_subscriptions: bool,
}

/// Trait for offer search providers.
///
/// Implementations are independently failable: "no results" is `Ok` with an
/// empty list, a missing credential is also an empty list, and only genuine
/// faults return errors — which the orchestrator absorbs per provider.
#[async_trait]
pub trait OfferProvider: Send + Sync + std::fmt::Debug {
    /// The result-mapping slot this provider fills.
    fn key(&self) -> ProviderKey;

    /// Search for offers matching the request.
    ///
    /// # Errors
    /// - `SearchError::SearchFailed` - Search operation failed
    /// - `SearchError::NetworkError` - Network connectivity issues
    /// - `SearchError::UpstreamStatus` - Hard HTTP fault from the upstream
    async fn search(&self, request: &SearchRequest) -> Result<Vec<OfferRecord>, SearchError>;
}

impl SearchRequest {
    /// A movies-mode request with defaults for everything but the query.
    pub fn movies(query: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            limit,
            mode: ContentMode::Movies,
            country: "FR".to_string(),
            include_subscriptions: false,
        }
    }
}
