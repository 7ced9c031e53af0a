//! Mock provider implementation for testing.

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use super::{OfferProvider, SearchRequest};
#[cfg(test)]
use crate::errors::SearchError;
#[cfg(test)]
use crate::types::{OfferRecord, ProviderKey};

/// Mock provider for testing: canned results or forced failure, with a
/// call counter for cache assertions.
#[cfg(test)]
#[derive(Debug)]
pub struct MockProvider {
    key: ProviderKey,
    results: Vec<OfferRecord>,
    fail: bool,
    calls: AtomicUsize,
}

#[cfg(test)]
impl MockProvider {
    /// Creates a mock returning the given records.
    pub fn returning(key: ProviderKey, results: Vec<OfferRecord>) -> Self {
        Self {
            key,
            results,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a mock that always fails.
    pub fn failing(key: ProviderKey) -> Self {
        Self {
            key,
            results: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `search` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl OfferProvider for MockProvider {
    fn key(&self) -> ProviderKey {
        self.key
    }

    async fn search(&self, _request: &SearchRequest) -> Result<Vec<OfferRecord>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SearchError::NetworkError {
                reason: "mock provider failure".to_string(),
            });
        }
        Ok(self.results.clone())
    }
}
