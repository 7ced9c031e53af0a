//! Direct storefront lookups, used when the marketplace aggregator finds
//! nothing.
//!
//! iTunes exposes a public catalog API and returns structured offers; the
//! other storefronts have no unauthenticated catalog and degrade to a
//! single "open the search page" placeholder record each.

use serde::Deserialize;

use crate::errors::SearchError;
use crate::types::OfferRecord;

const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";

/// Apple iTunes Store catalog client.
#[derive(Debug, Clone)]
pub struct ItunesStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    #[serde(default)]
    results: Vec<ItunesTrack>,
}

#[derive(Debug, Deserialize)]
struct ItunesTrack {
    #[serde(rename = "trackName")]
    track_name: Option<String>,
    #[serde(rename = "trackViewUrl")]
    track_view_url: Option<String>,
    #[serde(rename = "longDescription")]
    long_description: Option<String>,
    #[serde(rename = "shortDescription")]
    short_description: Option<String>,
    #[serde(rename = "artworkUrl100")]
    artwork_url: Option<String>,
    #[serde(rename = "releaseDate")]
    release_date: Option<String>,
    #[serde(rename = "trackPrice")]
    track_price: Option<f64>,
    currency: Option<String>,
}

impl ItunesStore {
    /// Creates a client against the production endpoint.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, ITUNES_SEARCH_URL.to_string())
    }

    /// Creates a client against a custom endpoint.
    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Searches the iTunes movie catalog.
    ///
    /// # Errors
    /// - `SearchError::NetworkError` - Request never reached the API
    /// - `SearchError::SearchFailed` - The API answered a non-success status
    /// - `SearchError::ParseError` - Response body was not the expected JSON
    pub async fn search(
        &self,
        query: &str,
        country: &str,
        limit: usize,
    ) -> Result<Vec<OfferRecord>, SearchError> {
        let limit_param = limit.to_string();
        let params: Vec<(&str, &str)> = vec![
            ("term", query),
            ("media", "movie"),
            ("entity", "movie"),
            ("country", country),
            ("limit", &limit_param),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::NetworkError {
                reason: format!("iTunes request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SearchError::SearchFailed {
                query: query.to_string(),
                reason: format!("iTunes HTTP {}", response.status()),
            });
        }

        let parsed: ItunesResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::ParseError {
                    reason: format!("iTunes JSON parsing failed: {e}"),
                })?;

        Ok(parsed
            .results
            .into_iter()
            .take(limit)
            .filter_map(|track| Self::record_from_track(track, query))
            .collect())
    }

    fn record_from_track(track: ItunesTrack, query: &str) -> Option<OfferRecord> {
        let stream_url = track.track_view_url?;
        let title = track
            .track_name
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| query.to_string());

        let mut record = OfferRecord::new(title, "Apple iTunes");
        record.year = track
            .release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok());
        record.description = track.long_description.or(track.short_description);
        record.poster_url = track.artwork_url;
        record.price = match (track.track_price, track.currency) {
            (Some(price), Some(currency)) => Some(format!("{price:.2} {currency}")),
            _ => None,
        };
        record.stream_url = Some(stream_url);
        Some(record)
    }
}

/// Prime Video has no unauthenticated catalog API; emit a search-page
/// placeholder record.
pub fn prime_video_search_link(query: &str) -> OfferRecord {
    let q = urlencoding::encode(query);
    let mut record = OfferRecord::new(format!("→ Prime Video : {query}"), "Amazon Prime Video");
    record.description = Some("Recherche Prime Video (achat/location)".to_string());
    record.stream_url = Some(format!("https://www.primevideo.com/search?phrase={q}"));
    record
}

/// Google Play placeholder record pointing at the movie-store search page.
pub fn google_play_search_link(query: &str, country: &str) -> OfferRecord {
    let q = urlencoding::encode(query);
    let mut record = OfferRecord::new(format!("→ Google Play : {query}"), "Google Play");
    record.description = Some("Recherche Google Play (achat/location)".to_string());
    record.stream_url = Some(format!(
        "https://play.google.com/store/search?c=movies&q={}&gl={}",
        q,
        country.to_uppercase()
    ));
    record
}

/// Rakuten TV placeholder record pointing at the catalog search page.
pub fn rakuten_search_link(query: &str, country: &str) -> OfferRecord {
    let q = urlencoding::encode(query);
    let mut record = OfferRecord::new(format!("→ Rakuten TV : {query}"), "Rakuten TV");
    record.description = Some("Recherche Rakuten TV (achat/location)".to_string());
    record.stream_url = Some(format!(
        "https://www.rakuten.tv/{}/search?query={}",
        country.to_lowercase(),
        q
    ));
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_itunes_track_mapping() {
        let track: ItunesTrack = serde_json::from_str(
            r#"{
                "trackName": "Nosferatu le vampire",
                "trackViewUrl": "https://itunes.apple.com/fr/movie/id12345",
                "longDescription": "Le classique muet de Murnau.",
                "artworkUrl100": "https://is1-ssl.mzstatic.com/image/nosferatu.jpg",
                "releaseDate": "1922-03-04T08:00:00Z",
                "trackPrice": 3.99,
                "currency": "EUR"
            }"#,
        )
        .unwrap();
        let record = ItunesStore::record_from_track(track, "nosferatu").unwrap();
        assert_eq!(record.title, "Nosferatu le vampire");
        assert_eq!(record.year, Some(1922));
        assert_eq!(record.price.as_deref(), Some("3.99 EUR"));
        assert_eq!(record.source, "Apple iTunes");
    }

    #[test]
    fn test_itunes_track_without_url_is_skipped() {
        let track: ItunesTrack = serde_json::from_str(r#"{"trackName": "No link"}"#).unwrap();
        assert!(ItunesStore::record_from_track(track, "query").is_none());
    }

    #[test]
    fn test_search_links_encode_query() {
        let record = prime_video_search_link("The Matrix");
        assert_eq!(
            record.stream_url.as_deref(),
            Some("https://www.primevideo.com/search?phrase=The%20Matrix")
        );

        let record = google_play_search_link("The Matrix", "fr");
        let url = record.stream_url.unwrap();
        assert!(url.contains("q=The%20Matrix"));
        assert!(url.ends_with("gl=FR"));

        let record = rakuten_search_link("The Matrix", "FR");
        let url = record.stream_url.unwrap();
        assert!(url.starts_with("https://www.rakuten.tv/fr/search"));
    }
}
