//! YouTube search provider for free full-length movies.
//!
//! Uses the Data API v3 search endpoint with a fixed "full movie" query
//! qualifier and a long-duration filter. Without an API key the provider is
//! unavailable and contributes an empty list.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{OfferProvider, SearchRequest};
use crate::errors::SearchError;
use crate::types::{OfferRecord, ProviderKey};

const API_URL: &str = "https://www.googleapis.com/youtube/v3/search";
/// The Data API caps maxResults at 50 per page.
const PAGE_CAP: usize = 50;

/// YouTube provider; requires a Data API key.
#[derive(Debug, Clone)]
pub struct YoutubeProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YoutubeResponse {
    #[serde(default)]
    items: Vec<YoutubeItem>,
}

#[derive(Debug, Deserialize)]
struct YoutubeItem {
    id: Option<YoutubeId>,
    snippet: Option<YoutubeSnippet>,
}

#[derive(Debug, Deserialize)]
struct YoutubeId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YoutubeSnippet {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
    thumbnails: Option<YoutubeThumbnails>,
}

#[derive(Debug, Deserialize)]
struct YoutubeThumbnails {
    high: Option<YoutubeThumbnail>,
}

#[derive(Debug, Deserialize)]
struct YoutubeThumbnail {
    url: Option<String>,
}

impl YoutubeProvider {
    /// Creates a provider with an explicit API key.
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    fn record_from_item(item: YoutubeItem, query: &str) -> Option<OfferRecord> {
        let video_id = item.id?.video_id?;
        let snippet = item.snippet;

        let title = snippet
            .as_ref()
            .and_then(|s| s.title.clone())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| query.to_string());

        let mut record = OfferRecord::new(title, "YouTube (gratuit)");
        record.description = snippet.as_ref().and_then(|s| s.description.clone());
        record.poster_url = snippet
            .as_ref()
            .and_then(|s| s.thumbnails.as_ref())
            .and_then(|t| t.high.as_ref())
            .and_then(|h| h.url.clone());
        record.stream_url = Some(format!("https://www.youtube.com/watch?v={video_id}"));
        if let Some(channel) = snippet.and_then(|s| s.channel_title) {
            record.extra.insert("channel".to_string(), channel);
        }
        Some(record)
    }
}

#[async_trait]
impl OfferProvider for YoutubeProvider {
    fn key(&self) -> ProviderKey {
        ProviderKey::Video
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<OfferRecord>, SearchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("YouTube API key not configured, skipping provider");
            return Ok(Vec::new());
        };

        let q = format!("{} full movie", request.query);
        let max_results = request.limit.min(PAGE_CAP).to_string();
        let params: Vec<(&str, &str)> = vec![
            ("part", "snippet"),
            ("q", &q),
            ("type", "video"),
            ("maxResults", &max_results),
            ("videoDuration", "long"),
            ("safeSearch", "moderate"),
            ("key", api_key),
        ];

        let response = self
            .client
            .get(API_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::NetworkError {
                reason: format!("YouTube request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SearchError::SearchFailed {
                query: request.query.clone(),
                reason: format!("YouTube HTTP {}", response.status()),
            });
        }

        let parsed: YoutubeResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::ParseError {
                    reason: format!("YouTube JSON parsing failed: {e}"),
                })?;

        Ok(parsed
            .items
            .into_iter()
            .filter_map(|item| Self::record_from_item(item, &request.query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_yields_empty() {
        let provider = YoutubeProvider::new(reqwest::Client::new(), None);
        let request = SearchRequest::movies("Nosferatu", 20);
        let results = provider.search(&request).await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_record_from_item() {
        let item: YoutubeItem = serde_json::from_str(
            r#"{
                "id": {"videoId": "abc123"},
                "snippet": {
                    "title": "Nosferatu (1922) Full Movie",
                    "description": "The classic vampire film.",
                    "channelTitle": "Silent Films",
                    "thumbnails": {"high": {"url": "https://i.ytimg.com/vi/abc123/hqdefault.jpg"}}
                }
            }"#,
        )
        .unwrap();
        let record = YoutubeProvider::record_from_item(item, "nosferatu").unwrap();
        assert_eq!(record.title, "Nosferatu (1922) Full Movie");
        assert_eq!(
            record.stream_url.as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
        assert_eq!(record.source, "YouTube (gratuit)");
        assert_eq!(
            record.extra.get("channel").map(String::as_str),
            Some("Silent Films")
        );
    }

    #[test]
    fn test_item_without_video_id_is_skipped() {
        let item: YoutubeItem =
            serde_json::from_str(r#"{"snippet": {"title": "No id"}}"#).unwrap();
        assert!(YoutubeProvider::record_from_item(item, "query").is_none());
    }
}
