//! Cinequete Search - Multi-provider movie search aggregation
//!
//! Fans a single user query out across heterogeneous providers (free media
//! archive, video platform, paid storefronts), reconciles and deduplicates
//! paid offers, optionally enriches results with poster/runtime metadata,
//! and returns one keyed result mapping per query.
//!
//! Providers fail soft: a missing credential, a timeout, or an upstream
//! fault degrades that provider's contribution to an empty list and never
//! taints the others.

#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod errors;
pub mod metadata;
pub mod paid;
pub mod providers;
pub mod types;

// Re-export main types
pub use aggregate::{AggregateRequest, SearchAggregator};
pub use cache::CachedSearch;
pub use config::SearchConfig;
pub use errors::SearchError;
pub use metadata::{Enrichment, TmdbMetadata};
pub use paid::{PaidProvider, fallback_links};
pub use providers::{OfferProvider, SearchRequest};
pub use types::{ContentMode, Monetization, OfferRecord, ProviderKey, ResultMap};

/// Convenience type alias for Results with SearchError.
pub type Result<T> = std::result::Result<T, SearchError>;
