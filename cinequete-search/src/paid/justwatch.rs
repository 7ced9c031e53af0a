//! JustWatch marketplace-aggregation client.
//!
//! The "real availability" source for paid offers: one search call returns
//! candidate titles, each optionally embedding storefront offers; a
//! per-title detail call fills in offers the search response left out.

use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::SearchError;

const API_BASE: &str = "https://apiv2.justwatch.com";

/// One candidate title from a JustWatch search.
#[derive(Debug, Clone, Deserialize)]
pub struct JwTitle {
    /// JustWatch numeric title id, needed for the detail lookup.
    pub id: Option<u64>,
    /// Display title.
    pub title: Option<String>,
    /// Original release year.
    pub original_release_year: Option<u16>,
    /// Path of the title's catalog page on justwatch.com.
    pub full_path: Option<String>,
    /// Storefront offers, when the search response embedded them.
    pub offers: Option<Vec<JwOffer>>,
}

/// One raw storefront offer attached to a title.
#[derive(Debug, Clone, Deserialize)]
pub struct JwOffer {
    /// Numeric storefront id (resolved to a name via the provider list).
    pub provider_id: Option<u32>,
    /// Country the offer applies to.
    pub country: Option<String>,
    /// Monetization code: buy, rent, flatrate, ads, free.
    pub monetization_type: Option<String>,
    /// Offer URLs; `standard_web` is the canonical one.
    #[serde(default)]
    pub urls: JwOfferUrls,
}

/// URL variants JustWatch attaches to an offer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwOfferUrls {
    /// Canonical web URL for the offer on the storefront.
    pub standard_web: Option<String>,
}

/// Per-title detail response.
#[derive(Debug, Deserialize)]
pub struct JwDetail {
    /// Storefront offers for the title.
    #[serde(default)]
    pub offers: Vec<JwOffer>,
    /// Catalog page path, when known.
    pub full_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwSearchResponse {
    #[serde(default)]
    items: Vec<JwTitle>,
}

#[derive(Debug, Deserialize)]
struct JwProviderEntry {
    id: u32,
    clear_name: String,
}

/// HTTP client for the JustWatch content API.
#[derive(Debug, Clone)]
pub struct JustWatchClient {
    client: reqwest::Client,
    base_url: String,
}

impl JustWatchClient {
    /// Creates a client against the production API.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, API_BASE.to_string())
    }

    /// Creates a client against a custom endpoint.
    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Locale path segment derived from a two-letter country code.
    fn locale(country: &str) -> String {
        format!("{}_{}", country.to_lowercase(), country.to_uppercase())
    }

    /// Searches movie titles matching `query`.
    ///
    /// # Errors
    /// - `SearchError::NetworkError` - Request never reached the API
    /// - `SearchError::UpstreamStatus` - The API answered a non-success
    ///   status (hard fault; callers abort the whole paid round)
    /// - `SearchError::ParseError` - Response body was not the expected JSON
    pub async fn search_titles(
        &self,
        query: &str,
        country: &str,
    ) -> Result<Vec<JwTitle>, SearchError> {
        let url = format!(
            "{}/content/titles/{}/popular",
            self.base_url,
            Self::locale(country)
        );
        let body = serde_json::json!({
            "query": query,
            "content_types": ["movie"],
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::NetworkError {
                reason: format!("JustWatch search failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SearchError::UpstreamStatus {
                status: response.status().as_u16(),
            });
        }

        let parsed: JwSearchResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::ParseError {
                    reason: format!("JustWatch JSON parsing failed: {e}"),
                })?;

        Ok(parsed.items)
    }

    /// Fetches the storefront id -> display name mapping.
    ///
    /// # Errors
    /// - `SearchError::NetworkError` - Request never reached the API
    /// - `SearchError::UpstreamStatus` - The API answered a non-success status
    /// - `SearchError::ParseError` - Response body was not the expected JSON
    pub async fn providers(&self, country: &str) -> Result<HashMap<u32, String>, SearchError> {
        let url = format!(
            "{}/content/providers/{}",
            self.base_url,
            Self::locale(country)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::NetworkError {
                reason: format!("JustWatch provider list failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SearchError::UpstreamStatus {
                status: response.status().as_u16(),
            });
        }

        let entries: Vec<JwProviderEntry> =
            response
                .json()
                .await
                .map_err(|e| SearchError::ParseError {
                    reason: format!("JustWatch JSON parsing failed: {e}"),
                })?;

        Ok(entries
            .into_iter()
            .map(|entry| (entry.id, entry.clear_name))
            .collect())
    }

    /// Fetches offers for one title by id.
    ///
    /// # Errors
    /// - `SearchError::NetworkError` - Request never reached the API
    /// - `SearchError::UpstreamStatus` - The API answered a non-success
    ///   status (hard fault; callers abort the whole paid round)
    /// - `SearchError::ParseError` - Response body was not the expected JSON
    pub async fn title_offers(
        &self,
        title_id: u64,
        country: &str,
    ) -> Result<JwDetail, SearchError> {
        let url = format!(
            "{}/content/titles/movie/{}/locale/{}",
            self.base_url,
            title_id,
            Self::locale(country)
        );

        let response = self
            .client
            .get(&url)
            .query(&[("language", "fr")])
            .send()
            .await
            .map_err(|e| SearchError::NetworkError {
                reason: format!("JustWatch title fetch failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SearchError::UpstreamStatus {
                status: response.status().as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::ParseError {
                reason: format!("JustWatch JSON parsing failed: {e}"),
            })
    }
}
