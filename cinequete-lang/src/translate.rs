//! Translation backends for the two-tier French translation pipeline.

use async_trait::async_trait;
use tracing::debug;

use crate::mymemory::MyMemoryClient;

/// Outcome of a translation request.
///
/// Always this exact shape; `changed` reports whether the translation is a
/// real change under the comparison key, never literal string inequality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Translated (or passed-through) text.
    pub text: String,
    /// Whether translating produced an actual change.
    pub changed: bool,
    /// Detected source language, when known.
    pub source_language: Option<String>,
}

/// One translation backend in the fallback chain.
///
/// Backends translate a single bounded chunk at a time and never error:
/// `None` means "no translation for this chunk", which callers turn into
/// pass-through.
#[async_trait]
pub trait TranslationBackend: Send + Sync + std::fmt::Debug {
    /// Translate one chunk to French, or `None` when the backend cannot.
    async fn translate_chunk(&self, chunk: &str) -> Option<String>;

    /// Whether the backend is worth attempting at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// Primary backend: the public Google translate web endpoint.
#[derive(Debug, Clone)]
pub struct GoogleWebTranslator {
    client: reqwest::Client,
}

impl GoogleWebTranslator {
    const API_URL: &'static str = "https://translate.googleapis.com/translate_a/single";

    /// Creates a translator reusing the given HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranslationBackend for GoogleWebTranslator {
    async fn translate_chunk(&self, chunk: &str) -> Option<String> {
        let response = self
            .client
            .get(Self::API_URL)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", "fr"),
                ("dt", "t"),
                ("q", chunk),
            ])
            .send()
            .await
            .map_err(|e| debug!("Google translate request failed: {}", e))
            .ok()?;

        if !response.status().is_success() {
            debug!("Google translate HTTP {}", response.status());
            return None;
        }

        // The endpoint answers a nested array; translated segments sit at
        // [0][i][0].
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| debug!("Google translate JSON parsing failed: {}", e))
            .ok()?;
        let segments = body.get(0)?.as_array()?;
        let mut out = String::new();
        for segment in segments {
            if let Some(piece) = segment.get(0).and_then(|p| p.as_str()) {
                out.push_str(piece);
            }
        }

        if out.trim().is_empty() { None } else { Some(out) }
    }
}

/// Secondary backend: MyMemory, used when the primary is unavailable or
/// silently echoed its input.
#[derive(Debug, Clone)]
pub struct MyMemoryTranslator {
    client: MyMemoryClient,
}

impl MyMemoryTranslator {
    /// Creates a translator reusing the given HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client: MyMemoryClient::new(client),
        }
    }
}

#[async_trait]
impl TranslationBackend for MyMemoryTranslator {
    async fn translate_chunk(&self, chunk: &str) -> Option<String> {
        self.client.translate_auto_to_french(chunk).await.translated
    }
}
