//! Cinequete CLI - One-shot movie search aggregation
//!
//! Runs a single aggregation across the configured providers and prints the
//! result mapping, with a language badge per record and optional French
//! translation of descriptions.

use anyhow::anyhow;
use clap::Parser;

use cinequete_lang::LanguageService;
use cinequete_search::{
    AggregateRequest, CachedSearch, ContentMode, OfferRecord, ProviderKey, SearchAggregator,
    SearchConfig, fallback_links,
};

#[derive(Parser)]
#[command(name = "cinequete")]
#[command(about = "Legal movie search aggregator")]
struct Cli {
    /// Movie title or free-text query
    query: String,

    /// Maximum results per provider
    #[arg(short = 'n', long, default_value = "20")]
    max_results: usize,

    /// Content mode: movies, non-movies, all
    #[arg(long, default_value = "movies")]
    mode: String,

    /// Provider priority order (comma separated)
    #[arg(long, default_value = "archive,video,paid", value_delimiter = ',')]
    providers: Vec<String>,

    /// Two-letter country code for paid offers
    #[arg(long, default_value = "FR")]
    country: String,

    /// Include subscription (flatrate) offers
    #[arg(long)]
    include_subscriptions: bool,

    /// Skip TMDB poster/runtime enrichment
    #[arg(long)]
    no_enrich: bool,

    /// Translate descriptions to French
    #[arg(long)]
    translate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mode: ContentMode = cli
        .mode
        .parse()
        .map_err(|e| anyhow!("invalid --mode: {e}"))?;
    let provider_order: Vec<ProviderKey> = cli
        .providers
        .iter()
        .map(|name| {
            name.parse::<ProviderKey>()
                .map_err(|e| anyhow!("invalid --providers: {e}"))
        })
        .collect::<anyhow::Result<_>>()?;

    let config = SearchConfig::from_env();
    let search = CachedSearch::new(SearchAggregator::new(&config));
    let language = LanguageService::new();

    let request = AggregateRequest {
        query: cli.query.clone(),
        max_results: cli.max_results,
        provider_order: provider_order.clone(),
        enrich_posters: !cli.no_enrich,
        mode,
        country: cli.country.clone(),
        include_subscriptions: cli.include_subscriptions,
    };

    let results = search.run(&request).await;

    for key in &provider_order {
        let Some(records) = results.get(key) else {
            continue;
        };
        println!("== {key} ({} résultats)", records.len());

        if records.is_empty() && *key == ProviderKey::Paid {
            // The reconciler confirmed nothing; offer the weaker tier of
            // hand-built search links instead.
            println!("   Aucune offre confirmée ; liens génériques :");
            for link in fallback_links(&cli.query, &cli.country, 6) {
                println!(
                    "   {} : {}",
                    link.title,
                    link.stream_url.unwrap_or_default()
                );
            }
            continue;
        }

        for record in records {
            print_record(record, &language, cli.translate).await;
        }
    }

    Ok(())
}

async fn print_record(record: &OfferRecord, language: &LanguageService, translate: bool) {
    let sample = record.description.as_deref().unwrap_or(&record.title);
    let badge = language.badge_for(sample).await;

    let year = record
        .year
        .map(|y| format!(" ({y})"))
        .unwrap_or_default();
    let runtime = record
        .duration_minutes
        .map(|m| format!(" · {m} min"))
        .unwrap_or_default();
    println!("[{badge}] {}{year}{runtime} – {}", record.title, record.source);

    if let Some(price) = &record.price {
        println!("      Prix : {price}");
    }
    if let Some(description) = &record.description {
        let shown = if translate {
            language.translate_to_french(description, false).await.text
        } else {
            description.clone()
        };
        println!("      {}", first_line(&shown, 160));
    }
    if let Some(url) = &record.stream_url {
        println!("      {url}");
    }
}

/// First line of `text`, truncated to `max_chars` on a character boundary.
fn first_line(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let truncated: String = line.chars().take(max_chars).collect();
    format!("{truncated}…")
}
