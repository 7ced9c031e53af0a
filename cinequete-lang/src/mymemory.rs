//! Thin client for the MyMemory translation API.
//!
//! Used two ways: as the secondary translation backend, and as the remote
//! language-detection side-channel (the `langpair=auto|fr` call reports the
//! detected source language alongside the translated text).

use serde::Deserialize;
use tracing::debug;

const API_URL: &str = "https://api.mymemory.translated.net/get";
const USER_AGENT: &str = "cinequete/0.1";

/// Outcome of one MyMemory call. Either field may be absent.
#[derive(Debug, Clone, Default)]
pub struct MyMemoryOutcome {
    /// Translated text, HTML-entity decoded. `None` when the API returned
    /// nothing usable.
    pub translated: Option<String>,
    /// Source language the API detected, lowercased.
    pub detected_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData", default)]
    response_data: Option<MyMemoryData>,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    #[serde(rename = "detectedLanguage")]
    detected_language: Option<String>,
}

/// Best-effort MyMemory client; every failure degrades to an empty outcome.
#[derive(Debug, Clone)]
pub struct MyMemoryClient {
    client: reqwest::Client,
}

impl MyMemoryClient {
    /// Creates a client reusing the given HTTP client and its timeouts.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Requests an `auto -> fr` translation for `text`.
    ///
    /// Network errors, non-success statuses, and malformed bodies all return
    /// an empty outcome rather than an error.
    pub async fn translate_auto_to_french(&self, text: &str) -> MyMemoryOutcome {
        let response = match self
            .client
            .get(API_URL)
            .query(&[("q", text), ("langpair", "auto|fr")])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("MyMemory request failed: {}", e);
                return MyMemoryOutcome::default();
            }
        };

        if !response.status().is_success() {
            debug!("MyMemory HTTP {}", response.status());
            return MyMemoryOutcome::default();
        }

        let parsed: MyMemoryResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("MyMemory JSON parsing failed: {}", e);
                return MyMemoryOutcome::default();
            }
        };

        let Some(data) = parsed.response_data else {
            return MyMemoryOutcome::default();
        };

        let translated = data
            .translated_text
            .map(|t| html_escape::decode_html_entities(&t).into_owned())
            .filter(|t| !t.trim().is_empty());
        let detected_language = data
            .detected_language
            .map(|c| c.to_lowercase())
            .filter(|c| !c.is_empty());

        MyMemoryOutcome {
            translated,
            detected_language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "responseData": {
                "translatedText": "Bonjour &amp; bienvenue",
                "detectedLanguage": "EN"
            }
        }"#;
        let parsed: MyMemoryResponse = serde_json::from_str(body).unwrap();
        let data = parsed.response_data.unwrap();
        assert_eq!(data.translated_text.as_deref(), Some("Bonjour &amp; bienvenue"));
        assert_eq!(data.detected_language.as_deref(), Some("EN"));
    }

    #[test]
    fn test_response_parsing_tolerates_missing_fields() {
        let parsed: MyMemoryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.response_data.is_none());
    }
}
