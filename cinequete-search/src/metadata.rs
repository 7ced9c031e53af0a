//! Poster and runtime enrichment using the TMDB API.

use serde::Deserialize;
use tracing::debug;

use crate::errors::SearchError;

const API_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w342";

/// TMDB metadata provider for filling in posters and runtimes the
/// originating provider left unset.
#[derive(Debug, Clone)]
pub struct TmdbMetadata {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Enrichment outcome; either field may be absent and absence is never an
/// error.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    /// Poster image URL for the best textual match.
    pub poster_url: Option<String>,
    /// Runtime in minutes from the per-title detail lookup.
    pub runtime_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    id: Option<u64>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbDetail {
    runtime: Option<u32>,
}

impl TmdbMetadata {
    /// Creates a metadata provider reading `TMDB_API_KEY` from the
    /// environment.
    pub fn new(client: reqwest::Client) -> Self {
        let api_key = std::env::var("TMDB_API_KEY").ok();
        Self::with_api_key(client, api_key)
    }

    /// Creates a metadata provider with an explicit API key.
    ///
    /// Allows configuration-driven API key instead of environment variable.
    pub fn with_api_key(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: API_BASE.to_string(),
            api_key,
        }
    }

    /// Looks up the best textual match for (title, year).
    ///
    /// No API key, no match, or any network fault all yield an empty
    /// enrichment. A failure of the follow-up runtime fetch degrades only
    /// the runtime, never the poster.
    pub async fn lookup(&self, title: &str, year: Option<u16>) -> Enrichment {
        if self.api_key.is_none() {
            debug!("TMDB API key not configured, skipping enrichment");
            return Enrichment::default();
        }

        let best_match = match self.search_movie(title, year).await {
            Ok(Some(movie)) => movie,
            Ok(None) => return Enrichment::default(),
            Err(e) => {
                debug!("TMDB search failed: {}", e);
                return Enrichment::default();
            }
        };

        let poster_url = best_match
            .poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{IMAGE_BASE}{p}"));

        let runtime_minutes = match best_match.id {
            Some(id) => match self.fetch_runtime(id).await {
                Ok(runtime) => runtime,
                Err(e) => {
                    debug!("TMDB runtime fetch failed: {}", e);
                    None
                }
            },
            None => None,
        };

        Enrichment {
            poster_url,
            runtime_minutes,
        }
    }

    async fn search_movie(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> Result<Option<TmdbMovie>, SearchError> {
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let year_param = year.map(|y| y.to_string());

        let mut params: Vec<(&str, &str)> = vec![("api_key", api_key), ("query", title)];
        if let Some(ref y) = year_param {
            params.push(("year", y));
        }

        let url = format!("{}/search/movie", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::MetadataFetchFailed {
                reason: format!("TMDB request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SearchError::MetadataFetchFailed {
                reason: format!("TMDB HTTP {}", response.status()),
            });
        }

        let parsed: TmdbSearchResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::MetadataFetchFailed {
                    reason: format!("TMDB JSON parsing failed: {e}"),
                })?;

        Ok(parsed.results.into_iter().next())
    }

    async fn fetch_runtime(&self, movie_id: u64) -> Result<Option<u32>, SearchError> {
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let url = format!("{}/movie/{}", self.base_url, movie_id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", api_key)])
            .send()
            .await
            .map_err(|e| SearchError::MetadataFetchFailed {
                reason: format!("TMDB request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SearchError::MetadataFetchFailed {
                reason: format!("TMDB HTTP {}", response.status()),
            });
        }

        let parsed: TmdbDetail =
            response
                .json()
                .await
                .map_err(|e| SearchError::MetadataFetchFailed {
                    reason: format!("TMDB JSON parsing failed: {e}"),
                })?;

        Ok(parsed.runtime.filter(|&r| r > 0))
    }
}
