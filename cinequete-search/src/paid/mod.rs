//! Paid offer reconciliation across storefronts.
//!
//! Tiered lookup: the JustWatch marketplace aggregator first (confirmed
//! offers, reconciled to one best offer per storefront and deduplicated by
//! canonical URL), direct storefront lookups when that finds nothing, and a
//! caller-requested set of generic search links as the last resort.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::SearchError;
use crate::providers::{OfferProvider, SearchRequest};
use crate::types::{Monetization, OfferRecord, ProviderKey};

pub mod justwatch;
pub mod links;
pub mod storefronts;

pub use justwatch::{JustWatchClient, JwOffer, JwTitle};
pub use links::fallback_links;
pub use storefronts::ItunesStore;

/// Paid storefronts reconciled into one logical provider.
#[derive(Debug, Clone)]
pub struct PaidProvider {
    justwatch: JustWatchClient,
    itunes: ItunesStore,
    candidate_cap: usize,
}

impl PaidProvider {
    /// Creates the provider with production endpoints and the default
    /// candidate cap.
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_candidate_cap(client, 8)
    }

    /// Creates the provider with production endpoints and an explicit
    /// candidate cap.
    pub fn with_candidate_cap(client: reqwest::Client, candidate_cap: usize) -> Self {
        Self::with_parts(
            JustWatchClient::new(client.clone()),
            ItunesStore::new(client),
            candidate_cap,
        )
    }

    /// Creates the provider from explicit parts.
    pub fn with_parts(justwatch: JustWatchClient, itunes: ItunesStore, candidate_cap: usize) -> Self {
        Self {
            justwatch,
            itunes,
            candidate_cap,
        }
    }

    /// Marketplace-aggregation tier: confirmed offers via JustWatch.
    async fn dynamic_tier(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<OfferRecord>, SearchError> {
        let titles = self
            .justwatch
            .search_titles(&request.query, &request.country)
            .await?;

        // Storefront names are display sugar; failure keeps the numeric ids.
        let storefront_names = self
            .justwatch
            .providers(&request.country)
            .await
            .unwrap_or_default();

        let allowed = allowed_monetizations(request.include_subscriptions);
        let mut used_urls: HashSet<String> = HashSet::new();
        let mut out: Vec<OfferRecord> = Vec::new();

        for title in titles.into_iter().take(self.candidate_cap) {
            let name = title
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| request.query.clone());
            let year = title.original_release_year;
            let mut full_path = title.full_path.clone();

            let offers = match title.offers {
                Some(offers) => offers,
                None => match title.id {
                    Some(id) => match self.justwatch.title_offers(id, &request.country).await {
                        Ok(detail) => {
                            if detail.full_path.is_some() {
                                full_path = detail.full_path;
                            }
                            detail.offers
                        }
                        Err(e @ SearchError::UpstreamStatus { .. }) => return Err(e),
                        Err(e) => {
                            debug!("JustWatch detail fetch failed for '{}': {}", name, e);
                            Vec::new()
                        }
                    },
                    None => Vec::new(),
                },
            };

            let filtered = filter_offers(offers, &request.country, &allowed);
            if filtered.is_empty() {
                continue;
            }

            let catalog_url = full_path.map(|path| format!("https://www.justwatch.com{path}"));
            reconcile_title(
                &name,
                year,
                &filtered,
                &storefront_names,
                catalog_url.as_deref(),
                &mut used_urls,
                &mut out,
            );

            if out.len() >= request.limit {
                out.truncate(request.limit);
                return Ok(out);
            }
        }

        Ok(out)
    }

    /// Direct storefront tier: iTunes structured offers plus search-page
    /// placeholders for storefronts without a public catalog API.
    async fn storefront_tier(&self, request: &SearchRequest) -> Vec<OfferRecord> {
        let mut used_urls: HashSet<String> = HashSet::new();
        let mut out: Vec<OfferRecord> = Vec::new();

        match self
            .itunes
            .search(&request.query, &request.country, request.limit)
            .await
        {
            Ok(records) => {
                for record in records {
                    push_unique(record, &mut used_urls, &mut out);
                }
            }
            Err(e) => debug!("iTunes lookup failed: {}", e),
        }

        for record in [
            storefronts::prime_video_search_link(&request.query),
            storefronts::google_play_search_link(&request.query, &request.country),
            storefronts::rakuten_search_link(&request.query, &request.country),
        ] {
            push_unique(record, &mut used_urls, &mut out);
        }

        out
    }
}

#[async_trait]
impl OfferProvider for PaidProvider {
    fn key(&self) -> ProviderKey {
        ProviderKey::Paid
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<OfferRecord>, SearchError> {
        let mut offers = match self.dynamic_tier(request).await {
            Ok(offers) => offers,
            Err(SearchError::UpstreamStatus { status }) => {
                // Unavailable this round, as opposed to "found nothing":
                // skip the storefront tier entirely.
                warn!("JustWatch HTTP {}, paid offers unavailable this round", status);
                return Ok(Vec::new());
            }
            Err(e) => {
                debug!("JustWatch lookup failed: {}", e);
                return Ok(Vec::new());
            }
        };

        if offers.is_empty() {
            offers = self.storefront_tier(request).await;
        }

        offers.truncate(request.limit);
        Ok(offers)
    }
}

/// Monetization types admitted for this request.
fn allowed_monetizations(include_subscriptions: bool) -> Vec<Monetization> {
    let mut allowed = vec![Monetization::Buy, Monetization::Rent];
    if include_subscriptions {
        allowed.push(Monetization::Subscription);
    }
    allowed
}

/// Keeps offers for the requested country with an admitted monetization
/// type.
fn filter_offers(offers: Vec<JwOffer>, country: &str, allowed: &[Monetization]) -> Vec<JwOffer> {
    offers
        .into_iter()
        .filter(|offer| {
            offer.country.as_deref() == Some(country)
                && offer
                    .monetization_type
                    .as_deref()
                    .and_then(Monetization::from_code)
                    .is_some_and(|m| allowed.contains(&m))
        })
        .collect()
}

/// Reconciles one best offer per distinct storefront id.
///
/// The offer with the lowest monetization priority index wins its
/// storefront; ties keep the first-seen offer, and unranked codes sort
/// last. Returned in first-seen storefront order.
fn best_offer_per_storefront(offers: &[JwOffer]) -> Vec<(u32, JwOffer)> {
    let mut order: Vec<u32> = Vec::new();
    let mut best: HashMap<u32, JwOffer> = HashMap::new();

    for offer in offers {
        let Some(storefront_id) = offer.provider_id else {
            continue;
        };
        match best.get(&storefront_id) {
            None => {
                order.push(storefront_id);
                best.insert(storefront_id, offer.clone());
            }
            Some(current) if monetization_rank(offer) < monetization_rank(current) => {
                best.insert(storefront_id, offer.clone());
            }
            Some(_) => {}
        }
    }

    order
        .into_iter()
        .filter_map(|id| best.remove(&id).map(|offer| (id, offer)))
        .collect()
}

fn monetization_rank(offer: &JwOffer) -> usize {
    offer
        .monetization_type
        .as_deref()
        .and_then(Monetization::from_code)
        .map(Monetization::priority)
        .unwrap_or(usize::MAX)
}

/// Builds records for one title's reconciled offers, skipping offers that
/// resolve to no URL or to a URL already emitted in this call.
fn reconcile_title(
    title: &str,
    year: Option<u16>,
    offers: &[JwOffer],
    storefront_names: &HashMap<u32, String>,
    catalog_url: Option<&str>,
    used_urls: &mut HashSet<String>,
    out: &mut Vec<OfferRecord>,
) {
    for (storefront_id, offer) in best_offer_per_storefront(offers) {
        let Some(url) = offer
            .urls
            .standard_web
            .clone()
            .or_else(|| catalog_url.map(str::to_string))
        else {
            continue;
        };
        if !used_urls.insert(url.clone()) {
            continue;
        }

        let storefront = storefront_names
            .get(&storefront_id)
            .cloned()
            .unwrap_or_else(|| format!("Plateforme {storefront_id}"));
        let label = offer
            .monetization_type
            .as_deref()
            .and_then(Monetization::from_code)
            .map(Monetization::label)
            .unwrap_or_default();

        let mut record = OfferRecord::new(title, format!("{storefront} ({label})"));
        record.year = year;
        record.description = Some(format!("Disponible sur {storefront} – {label}"));
        record.stream_url = Some(url);
        record
            .extra
            .insert("monetization".to_string(), label.to_string());
        record
            .extra
            .insert("provider_id".to_string(), storefront_id.to_string());
        out.push(record);
    }
}

fn push_unique(record: OfferRecord, used_urls: &mut HashSet<String>, out: &mut Vec<OfferRecord>) {
    match record.stream_url.as_ref() {
        Some(url) if !used_urls.insert(url.clone()) => {}
        _ => out.push(record),
    }
}

#[cfg(test)]
mod tests {
    use super::justwatch::JwOfferUrls;
    use super::*;

    fn offer(storefront_id: u32, monetization: &str, url: Option<&str>) -> JwOffer {
        JwOffer {
            provider_id: Some(storefront_id),
            country: Some("FR".to_string()),
            monetization_type: Some(monetization.to_string()),
            urls: JwOfferUrls {
                standard_web: url.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_buy_beats_rent_within_storefront() {
        let offers = vec![
            offer(3, "rent", Some("https://store.example/rent")),
            offer(3, "buy", Some("https://store.example/buy")),
        ];
        let best = best_offer_per_storefront(&offers);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].1.monetization_type.as_deref(), Some("buy"));
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let offers = vec![
            offer(3, "rent", Some("https://store.example/first")),
            offer(3, "rent", Some("https://store.example/second")),
        ];
        let best = best_offer_per_storefront(&offers);
        assert_eq!(
            best[0].1.urls.standard_web.as_deref(),
            Some("https://store.example/first")
        );
    }

    #[test]
    fn test_unranked_monetization_sorts_last() {
        let offers = vec![
            offer(3, "zzz", Some("https://store.example/zzz")),
            offer(3, "rent", Some("https://store.example/rent")),
        ];
        let best = best_offer_per_storefront(&offers);
        assert_eq!(best[0].1.monetization_type.as_deref(), Some("rent"));
    }

    #[test]
    fn test_storefronts_reconcile_independently() {
        let offers = vec![
            offer(3, "rent", Some("https://a.example/rent")),
            offer(8, "buy", Some("https://b.example/buy")),
        ];
        let best = best_offer_per_storefront(&offers);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].0, 3);
        assert_eq!(best[1].0, 8);
    }

    #[test]
    fn test_url_dedup_keeps_first_encountered() {
        let mut used_urls = HashSet::new();
        let mut out = Vec::new();
        let names = HashMap::from([(3, "Apple TV".to_string()), (8, "Google Play".to_string())]);

        reconcile_title(
            "Nosferatu",
            Some(1922),
            &[offer(3, "buy", Some("https://same.example/movie"))],
            &names,
            None,
            &mut used_urls,
            &mut out,
        );
        reconcile_title(
            "Nosferatu",
            Some(1922),
            &[offer(8, "buy", Some("https://same.example/movie"))],
            &names,
            None,
            &mut used_urls,
            &mut out,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, "Apple TV (achat)");
    }

    #[test]
    fn test_urlless_offer_falls_back_to_catalog_page_or_skips() {
        let mut used_urls = HashSet::new();
        let mut out = Vec::new();
        let names = HashMap::new();

        reconcile_title(
            "Nosferatu",
            None,
            &[offer(3, "rent", None)],
            &names,
            Some("https://www.justwatch.com/fr/film/nosferatu"),
            &mut used_urls,
            &mut out,
        );
        assert_eq!(
            out[0].stream_url.as_deref(),
            Some("https://www.justwatch.com/fr/film/nosferatu")
        );

        out.clear();
        reconcile_title(
            "Nosferatu",
            None,
            &[offer(4, "rent", None)],
            &names,
            None,
            &mut used_urls,
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_subscription_offers_filtered_unless_requested() {
        let offers = vec![
            offer(3, "flatrate", Some("https://sub.example/watch")),
            offer(8, "buy", Some("https://buy.example/watch")),
        ];

        let without = filter_offers(offers.clone(), "FR", &allowed_monetizations(false));
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].monetization_type.as_deref(), Some("buy"));

        let with = filter_offers(offers, "FR", &allowed_monetizations(true));
        assert_eq!(with.len(), 2);
    }

    #[test]
    fn test_no_subscription_label_when_excluded() {
        let offers = vec![
            offer(3, "flatrate", Some("https://sub.example/watch")),
            offer(3, "rent", Some("https://rent.example/watch")),
        ];
        let filtered = filter_offers(offers, "FR", &allowed_monetizations(false));

        let mut used_urls = HashSet::new();
        let mut out = Vec::new();
        reconcile_title(
            "Film",
            None,
            &filtered,
            &HashMap::new(),
            None,
            &mut used_urls,
            &mut out,
        );

        for record in &out {
            assert_ne!(
                record.extra.get("monetization").map(String::as_str),
                Some("abonnement")
            );
        }
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_offers_outside_country_filtered() {
        let mut foreign = offer(3, "buy", Some("https://us.example/watch"));
        foreign.country = Some("US".to_string());
        let filtered = filter_offers(vec![foreign], "FR", &allowed_monetizations(false));
        assert!(filtered.is_empty());
    }
}
