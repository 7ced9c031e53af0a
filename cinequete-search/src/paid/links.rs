//! Generic explore-manually links, the weakest paid tier.
//!
//! Always constructible regardless of query content, and labeled so the
//! caller can render them distinctly from confirmed offers.

use crate::types::OfferRecord;

/// Source label marking the unverified fallback tier.
pub const FALLBACK_SOURCE: &str = "Options payantes (fallback)";

const FALLBACK_DESCRIPTION: &str =
    "Liens génériques pour explorer manuellement si aucune offre confirmée ne remonte.";

/// Builds the fixed set of hand-built search-page links, capped at `limit`.
///
/// These are not confirmed offers: they are entry points for checking
/// availability manually, one per well-known storefront or platform.
pub fn fallback_links(query: &str, country: &str, limit: usize) -> Vec<OfferRecord> {
    let q = urlencoding::encode(query).into_owned();
    let country_path = country.to_lowercase();

    let links = [
        (
            format!("https://www.justwatch.com/{country_path}/recherche?q={q}"),
            "JustWatch (recherche)",
        ),
        (
            format!("https://www.youtube.com/results?search_query={q}%20film%20louer%20acheter"),
            "YouTube (louer/acheter)",
        ),
        (
            format!("https://tv.apple.com/search?term={q}"),
            "Apple TV (recherche)",
        ),
        (
            format!("https://www.primevideo.com/search?phrase={q}"),
            "Prime Video (recherche)",
        ),
        (
            format!("https://www.rakuten.tv/{country_path}/search?query={q}"),
            "Rakuten TV (recherche)",
        ),
        (
            format!("https://www.canalvod.com/search/{q}"),
            "CANAL VOD (recherche)",
        ),
    ];

    links
        .into_iter()
        .take(limit)
        .map(|(url, label)| {
            let mut record = OfferRecord::new(format!("→ {label}"), FALLBACK_SOURCE);
            record.description = Some(FALLBACK_DESCRIPTION.to_string());
            record.stream_url = Some(url);
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_links_are_labeled_and_capped() {
        let links = fallback_links("Nosferatu", "FR", 4);
        assert_eq!(links.len(), 4);
        for link in &links {
            assert_eq!(link.source, FALLBACK_SOURCE);
            assert!(link.stream_url.is_some());
            assert!(link.title.starts_with('→'));
        }
    }

    #[test]
    fn test_fallback_links_encode_query_and_country() {
        let links = fallback_links("western muet", "FR", 6);
        assert_eq!(links.len(), 6);
        assert!(
            links[0]
                .stream_url
                .as_deref()
                .unwrap()
                .starts_with("https://www.justwatch.com/fr/recherche?q=western%20muet")
        );
    }
}
