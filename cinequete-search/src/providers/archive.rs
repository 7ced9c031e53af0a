//! Archive.org search provider.
//!
//! Queries the advanced-search endpoint with a media-type clause derived
//! from the active content mode, sorted by download count.

use async_trait::async_trait;
use serde::Deserialize;

use super::{OfferProvider, SearchRequest};
use crate::errors::SearchError;
use crate::types::{ContentMode, OfferRecord, ProviderKey};

const SEARCH_URL: &str = "https://archive.org/advancedsearch.php";

/// Archive.org provider for free, legally hosted media.
#[derive(Debug, Clone)]
pub struct ArchiveProvider {
    client: reqwest::Client,
    base_url: String,
}

/// Response from the advanced-search endpoint.
#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    response: Option<ArchiveBody>,
}

#[derive(Debug, Deserialize)]
struct ArchiveBody {
    #[serde(default)]
    docs: Vec<ArchiveDoc>,
}

/// Single catalog document. Archive.org is loose about field shapes:
/// `description` may be a string or a list, `year` a number or a string.
#[derive(Debug, Deserialize)]
struct ArchiveDoc {
    identifier: Option<String>,
    title: Option<String>,
    description: Option<TextOrList>,
    year: Option<serde_json::Value>,
    mediatype: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    fn joined(self) -> String {
        match self {
            TextOrList::Text(text) => text,
            TextOrList::List(fragments) => fragments.join(" "),
        }
    }
}

impl ArchiveProvider {
    /// Creates a provider against the production endpoint.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, SEARCH_URL.to_string())
    }

    /// Creates a provider against a custom endpoint.
    pub fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Media-type clause composed with the free-text query via logical AND.
    fn mediatype_clause(mode: ContentMode) -> &'static str {
        match mode {
            ContentMode::Movies => "AND mediatype:(movies)",
            ContentMode::NonMovies => "AND -mediatype:(movies)",
            ContentMode::All => "",
        }
    }

    fn parse_year(value: Option<&serde_json::Value>) -> Option<u16> {
        match value? {
            serde_json::Value::Number(n) => n.as_u64().and_then(|y| u16::try_from(y).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn record_from_doc(doc: ArchiveDoc, query: &str) -> Option<OfferRecord> {
        let identifier = doc.identifier?;
        let title = doc
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| identifier.clone());
        let title = if title.trim().is_empty() {
            query.to_string()
        } else {
            title
        };
        let page_url = format!("https://archive.org/details/{identifier}");
        let mediatype = doc.mediatype.unwrap_or_default();

        let mut record = OfferRecord::new(title, format!("Archive.org ({mediatype})"));
        record.year = Self::parse_year(doc.year.as_ref());
        record.description = doc.description.map(TextOrList::joined);
        record.poster_url = Some(format!("https://archive.org/services/img/{identifier}"));
        record.stream_url = Some(page_url.clone());
        record.download_url = Some(page_url);
        record.extra.insert("identifier".to_string(), identifier);
        Some(record)
    }
}

#[async_trait]
impl OfferProvider for ArchiveProvider {
    fn key(&self) -> ProviderKey {
        ProviderKey::Archive
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<OfferRecord>, SearchError> {
        let clause = Self::mediatype_clause(request.mode);
        let q = format!("({}) {}", request.query, clause).trim().to_string();
        let rows = request.limit.to_string();

        let params: Vec<(&str, &str)> = vec![
            ("q", &q),
            ("fl[]", "identifier"),
            ("fl[]", "title"),
            ("fl[]", "description"),
            ("fl[]", "year"),
            ("fl[]", "mediatype"),
            ("rows", &rows),
            ("page", "1"),
            ("output", "json"),
            ("sort[]", "downloads desc"),
        ];

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::NetworkError {
                reason: format!("Archive.org request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(SearchError::SearchFailed {
                query: request.query.clone(),
                reason: format!("Archive.org HTTP {}", response.status()),
            });
        }

        let parsed: ArchiveResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::ParseError {
                    reason: format!("Archive.org JSON parsing failed: {e}"),
                })?;

        let docs = parsed.response.map(|body| body.docs).unwrap_or_default();
        Ok(docs
            .into_iter()
            .filter_map(|doc| Self::record_from_doc(doc, &request.query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mediatype_clause() {
        assert_eq!(
            ArchiveProvider::mediatype_clause(ContentMode::Movies),
            "AND mediatype:(movies)"
        );
        assert_eq!(
            ArchiveProvider::mediatype_clause(ContentMode::NonMovies),
            "AND -mediatype:(movies)"
        );
        assert_eq!(ArchiveProvider::mediatype_clause(ContentMode::All), "");
    }

    #[test]
    fn test_record_from_doc() {
        let doc: ArchiveDoc = serde_json::from_str(
            r#"{
                "identifier": "nosferatu_1922",
                "title": "Nosferatu",
                "description": "A silent classic.",
                "year": "1922",
                "mediatype": "movies"
            }"#,
        )
        .unwrap();
        let record = ArchiveProvider::record_from_doc(doc, "nosferatu").unwrap();
        assert_eq!(record.title, "Nosferatu");
        assert_eq!(record.year, Some(1922));
        assert_eq!(
            record.stream_url.as_deref(),
            Some("https://archive.org/details/nosferatu_1922")
        );
        assert_eq!(record.stream_url, record.download_url);
        assert_eq!(record.source, "Archive.org (movies)");
        assert_eq!(
            record.extra.get("identifier").map(String::as_str),
            Some("nosferatu_1922")
        );
    }

    #[test]
    fn test_record_title_falls_back_to_identifier() {
        let doc: ArchiveDoc = serde_json::from_str(
            r#"{"identifier": "some_reel", "year": 1955, "mediatype": "movies"}"#,
        )
        .unwrap();
        let record = ArchiveProvider::record_from_doc(doc, "western").unwrap();
        assert_eq!(record.title, "some_reel");
        assert_eq!(record.year, Some(1955));
    }

    #[test]
    fn test_record_joins_description_list() {
        let doc: ArchiveDoc = serde_json::from_str(
            r#"{
                "identifier": "reel",
                "title": "Reel",
                "description": ["Part one.", "Part two."]
            }"#,
        )
        .unwrap();
        let record = ArchiveProvider::record_from_doc(doc, "reel").unwrap();
        assert_eq!(record.description.as_deref(), Some("Part one. Part two."));
    }

    #[test]
    fn test_doc_without_identifier_is_skipped() {
        let doc: ArchiveDoc = serde_json::from_str(r#"{"title": "Orphan"}"#).unwrap();
        assert!(ArchiveProvider::record_from_doc(doc, "orphan").is_none());
    }
}
