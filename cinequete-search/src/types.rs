//! Data types for movie search aggregation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One discoverable way to watch or obtain a title, normalized from any
/// provider's raw response.
///
/// `stream_url` is the deduplication identity: two records with the same
/// exact URL are the same offer. Records without a `stream_url` are never
/// deduplicated against each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRecord {
    /// Display title; never empty (adapters fall back to the query string).
    pub title: String,
    /// Release year.
    pub year: Option<u16>,
    /// Runtime in minutes; may be filled post-hoc by enrichment.
    pub duration_minutes: Option<u32>,
    /// Free-text description, possibly multi-paragraph.
    pub description: Option<String>,
    /// Poster image URL; may be filled post-hoc by enrichment.
    pub poster_url: Option<String>,
    /// Page where the title can be watched.
    pub stream_url: Option<String>,
    /// Page where the title can be downloaded (may equal `stream_url`).
    pub download_url: Option<String>,
    /// Formatted price string for paid offers.
    pub price: Option<String>,
    /// Provider label, including monetization type for paid offers.
    pub source: String,
    /// Provider-specific key-value data (catalog id, monetization code,
    /// provider numeric id, channel name).
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl OfferRecord {
    /// Creates a record with only title and source set.
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            duration_minutes: None,
            description: None,
            poster_url: None,
            stream_url: None,
            download_url: None,
            price: None,
            source: source.into(),
            extra: HashMap::new(),
        }
    }
}

/// The fixed set of provider slots a query fans out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKey {
    /// Free public media archive (Archive.org).
    Archive,
    /// Video-sharing platform (YouTube).
    Video,
    /// Paid storefronts, reconciled into one logical provider.
    Paid,
}

impl ProviderKey {
    /// Stable string name, used in logs and CLI arguments.
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKey::Archive => "archive",
            ProviderKey::Video => "video",
            ProviderKey::Paid => "paid",
        }
    }

    /// Default provider priority order.
    pub fn default_order() -> Vec<ProviderKey> {
        vec![ProviderKey::Archive, ProviderKey::Video, ProviderKey::Paid]
    }

    /// Whether this provider only makes sense for movie content. Such
    /// providers are excluded under [`ContentMode::NonMovies`].
    pub fn movie_centric(self) -> bool {
        matches!(self, ProviderKey::Video | ProviderKey::Paid)
    }
}

impl std::str::FromStr for ProviderKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "archive" => Ok(ProviderKey::Archive),
            "video" | "youtube" => Ok(ProviderKey::Video),
            "paid" => Ok(ProviderKey::Paid),
            _ => Err(format!("Unknown provider key: {s}")),
        }
    }
}

impl std::fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content-mode filter applied before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentMode {
    /// Movies only: a positive media-type filter on the archive provider.
    Movies,
    /// Everything except movies; movie-centric providers are skipped.
    NonMovies,
    /// No media-type filter at all.
    All,
}

impl std::str::FromStr for ContentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movies" | "films" => Ok(ContentMode::Movies),
            "non-movies" | "others" | "autres" => Ok(ContentMode::NonMovies),
            "all" | "tout" => Ok(ContentMode::All),
            _ => Err(format!("Unknown content mode: {s}")),
        }
    }
}

/// How a paid offer is accessed. Lower priority index wins when multiple
/// offers for the same title compete within one storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Monetization {
    /// Permanent purchase.
    Buy,
    /// Time-limited rental.
    Rent,
    /// Subscription (flatrate) access.
    Subscription,
    /// Free with advertising.
    Ads,
    /// Free without strings.
    Free,
}

impl Monetization {
    /// Parses a provider monetization code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "buy" => Some(Monetization::Buy),
            "rent" => Some(Monetization::Rent),
            "flatrate" => Some(Monetization::Subscription),
            "ads" => Some(Monetization::Ads),
            "free" => Some(Monetization::Free),
            _ => None,
        }
    }

    /// Priority index in the reconciliation total order; lower wins.
    pub fn priority(self) -> usize {
        match self {
            Monetization::Buy => 0,
            Monetization::Rent => 1,
            Monetization::Subscription => 2,
            Monetization::Ads => 3,
            Monetization::Free => 4,
        }
    }

    /// The wire code the marketplace aggregator uses.
    pub fn code(self) -> &'static str {
        match self {
            Monetization::Buy => "buy",
            Monetization::Rent => "rent",
            Monetization::Subscription => "flatrate",
            Monetization::Ads => "ads",
            Monetization::Free => "free",
        }
    }

    /// French display label.
    pub fn label(self) -> &'static str {
        match self {
            Monetization::Buy => "achat",
            Monetization::Rent => "location",
            Monetization::Subscription => "abonnement",
            Monetization::Ads => "avec pub",
            Monetization::Free => "gratuit",
        }
    }
}

/// Per-query result mapping: provider slot to its ordered records.
/// List order within a key is provider-native; key order is insignificant.
pub type ResultMap = HashMap<ProviderKey, Vec<OfferRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monetization_priority_order() {
        assert!(Monetization::Buy.priority() < Monetization::Rent.priority());
        assert!(Monetization::Rent.priority() < Monetization::Subscription.priority());
        assert!(Monetization::Subscription.priority() < Monetization::Ads.priority());
        assert!(Monetization::Ads.priority() < Monetization::Free.priority());
    }

    #[test]
    fn test_monetization_codes_round_trip() {
        for monetization in [
            Monetization::Buy,
            Monetization::Rent,
            Monetization::Subscription,
            Monetization::Ads,
            Monetization::Free,
        ] {
            assert_eq!(Monetization::from_code(monetization.code()), Some(monetization));
        }
        assert_eq!(Monetization::from_code("zzz"), None);
    }

    #[test]
    fn test_monetization_labels() {
        assert_eq!(Monetization::Subscription.label(), "abonnement");
        assert_eq!(Monetization::Buy.label(), "achat");
    }

    #[test]
    fn test_provider_key_parsing() {
        assert_eq!("archive".parse::<ProviderKey>(), Ok(ProviderKey::Archive));
        assert_eq!("youtube".parse::<ProviderKey>(), Ok(ProviderKey::Video));
        assert_eq!("PAID".parse::<ProviderKey>(), Ok(ProviderKey::Paid));
        assert!("netflix".parse::<ProviderKey>().is_err());
    }

    #[test]
    fn test_content_mode_parsing() {
        assert_eq!("films".parse::<ContentMode>(), Ok(ContentMode::Movies));
        assert_eq!("autres".parse::<ContentMode>(), Ok(ContentMode::NonMovies));
        assert_eq!("all".parse::<ContentMode>(), Ok(ContentMode::All));
    }

    #[test]
    fn test_offer_record_defaults() {
        let record = OfferRecord::new("Nosferatu", "Archive.org (movies)");
        assert_eq!(record.title, "Nosferatu");
        assert!(record.stream_url.is_none());
        assert!(record.extra.is_empty());
    }
}
