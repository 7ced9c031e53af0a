//! Language detection and French translation service.

use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::mymemory::MyMemoryClient;
use crate::text;
use crate::translate::{GoogleWebTranslator, MyMemoryTranslator, Translation, TranslationBackend};

/// Detection memo capacity; identical titles and descriptions repeat a lot
/// across queries.
const DETECT_CACHE_CAP: usize = 2048;
/// Per-chunk translation memo capacity for the secondary backend.
const CHUNK_CACHE_CAP: usize = 1024;
/// Remote detection sample cap, in characters.
const DETECT_SAMPLE_CAP: usize = 5000;
/// Per-request timeout for the translation/detection endpoints.
const HTTP_TIMEOUT: Duration = Duration::from_secs(12);

/// Maps a detected language code to its 2-letter display tag.
///
/// Known codes render as their uppercase selves, unknown codes truncate to
/// their first two characters uppercased, and no code at all renders as
/// `"??"`.
pub fn badge_label(code: Option<&str>) -> String {
    const KNOWN: [&str; 6] = ["fr", "en", "es", "de", "it", "pt"];
    match code {
        None | Some("") => "??".to_string(),
        Some(code) if KNOWN.contains(&code) => code.to_uppercase(),
        Some(code) => code.to_uppercase().chars().take(2).collect(),
    }
}

/// Detects text language and translates non-French text to French.
///
/// Owns the bounded memo caches and the two translation backends. All
/// operations are best-effort: a missing detector, a network timeout, or a
/// malformed response degrade to `None`/pass-through, never an error.
pub struct LanguageService {
    detect_cache: Mutex<LruCache<String, Option<String>>>,
    chunk_cache: Mutex<LruCache<String, Option<String>>>,
    remote_detect: Option<MyMemoryClient>,
    primary: Box<dyn TranslationBackend>,
    secondary: Box<dyn TranslationBackend>,
}

impl std::fmt::Debug for LanguageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageService")
            .field("remote_detect", &self.remote_detect.is_some())
            .finish_non_exhaustive()
    }
}

impl LanguageService {
    /// Creates the full service: local detection with remote fallback,
    /// Google web endpoint as primary translator, MyMemory as secondary.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self::with_backends(
            Box::new(GoogleWebTranslator::new(client.clone())),
            Box::new(MyMemoryTranslator::new(client.clone())),
        )
        .remote_detection(MyMemoryClient::new(client))
    }

    /// Creates a service with explicit translation backends and no remote
    /// detection fallback. Detection still runs locally.
    pub fn with_backends(
        primary: Box<dyn TranslationBackend>,
        secondary: Box<dyn TranslationBackend>,
    ) -> Self {
        let detect_capacity = NonZeroUsize::new(DETECT_CACHE_CAP).unwrap_or(NonZeroUsize::MIN);
        let chunk_capacity = NonZeroUsize::new(CHUNK_CACHE_CAP).unwrap_or(NonZeroUsize::MIN);

        Self {
            detect_cache: Mutex::new(LruCache::new(detect_capacity)),
            chunk_cache: Mutex::new(LruCache::new(chunk_capacity)),
            remote_detect: None,
            primary,
            secondary,
        }
    }

    /// Enables the remote detection side-channel.
    pub fn remote_detection(mut self, client: MyMemoryClient) -> Self {
        self.remote_detect = Some(client);
        self
    }

    /// Detects the language of `text`, returning a lowercase code or `None`
    /// when it cannot be determined. Empty input is `None`, not an error.
    pub async fn detect(&self, text: &str) -> Option<String> {
        let normalized = text::normalize(text);
        if normalized.is_empty() {
            return None;
        }

        if let Some(cached) = self.detect_cache.lock().get(&normalized) {
            return cached.clone();
        }

        let mut code = local_detect(&normalized);
        if code.is_none() {
            code = self.remote_detect_language(&normalized).await;
        }

        self.detect_cache.lock().put(normalized, code.clone());
        code
    }

    /// Detects the language of a list of text fragments, joined with spaces
    /// before normalization.
    pub async fn detect_fragments(&self, fragments: &[&str]) -> Option<String> {
        let joined = fragments
            .iter()
            .filter(|f| !f.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        self.detect(&joined).await
    }

    /// Translates `text` to French.
    ///
    /// Short-circuits when the text is already detected as French and
    /// `force` is false. Otherwise translates chunk-by-chunk through the
    /// primary backend, falling back to the secondary when the primary is
    /// unavailable or produced no real change. When both tiers fail the
    /// normalized original comes back with `changed == false`.
    pub async fn translate_to_french(&self, text: &str, force: bool) -> Translation {
        if text.trim().is_empty() {
            return Translation {
                text: String::new(),
                changed: false,
                source_language: None,
            };
        }

        let source = self.detect(text).await;
        if source.as_deref() == Some("fr") && !force {
            return Translation {
                text: text.to_string(),
                changed: false,
                source_language: Some("fr".to_string()),
            };
        }

        let normalized = text::normalize(text);
        let original_key = text::comparison_key(&normalized);
        let chunks = text::split_chunks(&normalized, text::MAX_CHUNK_LEN);

        if self.primary.is_available() {
            let mut translated = Vec::with_capacity(chunks.len());
            for chunk in &chunks {
                let piece = self.primary.translate_chunk(chunk).await;
                translated.push(piece.unwrap_or_else(|| chunk.clone()));
            }
            let joined = translated.join("\n\n").trim().to_string();
            if text::comparison_key(&joined) != original_key {
                let source_language = match source {
                    Some(code) => Some(code),
                    None => self.detect(&joined).await,
                };
                return Translation {
                    text: joined,
                    changed: true,
                    source_language,
                };
            }
            debug!("primary translation produced no change, trying fallback");
        }

        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let piece = self.secondary_chunk(chunk).await;
            translated.push(piece.unwrap_or_else(|| chunk.clone()));
        }
        let joined = translated.join("\n\n").trim().to_string();
        let changed = text::comparison_key(&joined) != original_key;
        let source_language = match source {
            Some(code) => Some(code),
            None if changed => self.detect(&joined).await,
            None => None,
        };

        Translation {
            text: joined,
            changed,
            source_language,
        }
    }

    /// Detects the language of `sample` and renders it as a 2-letter badge.
    pub async fn badge_for(&self, sample: &str) -> String {
        badge_label(self.detect(sample).await.as_deref())
    }

    async fn remote_detect_language(&self, normalized: &str) -> Option<String> {
        let remote = self.remote_detect.as_ref()?;
        let sample: String = normalized.chars().take(DETECT_SAMPLE_CAP).collect();
        remote
            .translate_auto_to_french(&sample)
            .await
            .detected_language
    }

    /// Secondary-tier chunk translation, memoized per chunk.
    async fn secondary_chunk(&self, chunk: &str) -> Option<String> {
        if let Some(cached) = self.chunk_cache.lock().get(chunk) {
            return cached.clone();
        }
        let translated = self.secondary.translate_chunk(chunk).await;
        self.chunk_cache
            .lock()
            .put(chunk.to_string(), translated.clone());
        translated
    }
}

impl Default for LanguageService {
    fn default() -> Self {
        Self::new()
    }
}

/// Local detection tier. Unreliable or unmapped detections fall through to
/// the remote tier.
fn local_detect(text: &str) -> Option<String> {
    let info = whatlang::detect(text)?;
    if !info.is_reliable() {
        return None;
    }
    iso_639_1(info.lang()).map(str::to_string)
}

/// Whatlang reports ISO 639-3; map the languages the providers actually
/// serve to their 2-letter codes.
fn iso_639_1(lang: whatlang::Lang) -> Option<&'static str> {
    use whatlang::Lang;

    match lang {
        Lang::Fra => Some("fr"),
        Lang::Eng => Some("en"),
        Lang::Spa => Some("es"),
        Lang::Deu => Some("de"),
        Lang::Ita => Some("it"),
        Lang::Por => Some("pt"),
        Lang::Nld => Some("nl"),
        Lang::Rus => Some("ru"),
        Lang::Pol => Some("pl"),
        Lang::Swe => Some("sv"),
        Lang::Tur => Some("tr"),
        Lang::Jpn => Some("ja"),
        Lang::Kor => Some("ko"),
        Lang::Cmn => Some("zh"),
        Lang::Ara => Some("ar"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    const FRENCH_SAMPLE: &str = "Bonjour le monde, ceci est un petit texte de \
        démonstration entièrement rédigé en français pour la détection.";
    const ENGLISH_SAMPLE: &str = "A silent horror film from 1922, widely \
        considered one of the most influential movies ever made.";

    /// Backend returning a fixed reply, or nothing.
    #[derive(Debug)]
    struct StubBackend {
        reply: Option<String>,
        available: bool,
    }

    impl StubBackend {
        fn replying(reply: &str) -> Box<Self> {
            Box::new(Self {
                reply: Some(reply.to_string()),
                available: true,
            })
        }

        fn failing() -> Box<Self> {
            Box::new(Self {
                reply: None,
                available: true,
            })
        }

        fn unavailable() -> Box<Self> {
            Box::new(Self {
                reply: None,
                available: false,
            })
        }
    }

    #[async_trait]
    impl TranslationBackend for StubBackend {
        async fn translate_chunk(&self, _chunk: &str) -> Option<String> {
            self.reply.clone()
        }

        fn is_available(&self) -> bool {
            self.available
        }
    }

    fn offline_service(
        primary: Box<dyn TranslationBackend>,
        secondary: Box<dyn TranslationBackend>,
    ) -> LanguageService {
        LanguageService::with_backends(primary, secondary)
    }

    #[tokio::test]
    async fn test_detect_empty_returns_unknown() {
        let service = offline_service(StubBackend::failing(), StubBackend::failing());
        assert_eq!(service.detect("").await, None);
        assert_eq!(service.detect("   \n  ").await, None);
    }

    #[tokio::test]
    async fn test_detect_french_locally() {
        let service = offline_service(StubBackend::failing(), StubBackend::failing());
        assert_eq!(service.detect(FRENCH_SAMPLE).await.as_deref(), Some("fr"));
    }

    #[tokio::test]
    async fn test_detect_fragments_joined() {
        let service = offline_service(StubBackend::failing(), StubBackend::failing());
        let fragments = ["Bonjour le monde,", "", "un texte rédigé en français."];
        assert_eq!(
            service.detect_fragments(&fragments).await.as_deref(),
            Some("fr")
        );
    }

    #[tokio::test]
    async fn test_translate_french_short_circuits() {
        // A would-translate backend must never be reached for French input.
        let service = offline_service(
            StubBackend::replying("should not appear"),
            StubBackend::replying("should not appear"),
        );
        let translation = service.translate_to_french(FRENCH_SAMPLE, false).await;
        assert_eq!(translation.text, FRENCH_SAMPLE);
        assert!(!translation.changed);
        assert_eq!(translation.source_language.as_deref(), Some("fr"));
    }

    #[tokio::test]
    async fn test_translate_force_overrides_short_circuit() {
        let service = offline_service(
            StubBackend::replying("Texte totalement différent après traduction."),
            StubBackend::failing(),
        );
        let translation = service.translate_to_french(FRENCH_SAMPLE, true).await;
        assert!(translation.changed);
        assert_eq!(
            translation.text,
            "Texte totalement différent après traduction."
        );
    }

    #[tokio::test]
    async fn test_translate_total_fallback_passes_through() {
        let service = offline_service(StubBackend::failing(), StubBackend::failing());
        let translation = service.translate_to_french(ENGLISH_SAMPLE, false).await;
        assert_eq!(translation.text, crate::text::normalize(ENGLISH_SAMPLE));
        assert!(!translation.changed);
        assert_eq!(translation.source_language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_translate_falls_back_when_primary_unavailable() {
        let service = offline_service(
            StubBackend::unavailable(),
            StubBackend::replying("Un film d'horreur muet de 1922."),
        );
        let translation = service.translate_to_french(ENGLISH_SAMPLE, false).await;
        assert!(translation.changed);
        assert_eq!(translation.text, "Un film d'horreur muet de 1922.");
        assert_eq!(translation.source_language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_translate_echoing_primary_triggers_fallback() {
        // Primary "translates" by echoing the input; the comparison key sees
        // no change and the secondary tier takes over.
        let echoed = crate::text::normalize(ENGLISH_SAMPLE);
        let service = offline_service(
            Box::new(EchoBackend { text: echoed }),
            StubBackend::replying("Un film d'horreur muet de 1922."),
        );
        let translation = service.translate_to_french(ENGLISH_SAMPLE, false).await;
        assert!(translation.changed);
        assert_eq!(translation.text, "Un film d'horreur muet de 1922.");
    }

    #[derive(Debug)]
    struct EchoBackend {
        text: String,
    }

    #[async_trait]
    impl TranslationBackend for EchoBackend {
        async fn translate_chunk(&self, _chunk: &str) -> Option<String> {
            Some(self.text.clone())
        }
    }

    #[test]
    fn test_badge_labels() {
        assert_eq!(badge_label(Some("fr")), "FR");
        assert_eq!(badge_label(Some("en")), "EN");
        assert_eq!(badge_label(Some("pt")), "PT");
        assert_eq!(badge_label(Some("nld")), "NL");
        assert_eq!(badge_label(Some("x")), "X");
        assert_eq!(badge_label(None), "??");
        assert_eq!(badge_label(Some("")), "??");
    }
}
