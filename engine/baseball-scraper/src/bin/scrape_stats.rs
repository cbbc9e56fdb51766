use anyhow::{bail, Context};
use baseball_scraper::{FetcherConfig, Site, StatCategory, StatTable, StatsScraper};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct ScrapeOutput {
    url: String,
    site: Site,
    tables: BTreeMap<String, Option<StatTable>>,
}

/// Usage: scrape_stats <url> [category...]
///
/// With no categories, every table known for the page's site is scraped.
/// Configuration comes from `BASEBALL_SCRAPER_*` environment variables.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        bail!("usage: scrape_stats <url> [category...]");
    };

    let site = Site::classify(&url).with_context(|| format!("unsupported page {url}"))?;
    let mut categories = args
        .map(|arg| arg.parse::<StatCategory>())
        .collect::<Result<Vec<_>, _>>()?;
    if categories.is_empty() {
        categories = StatCategory::for_site(site);
    }

    let config = FetcherConfig::from_env().context("reading configuration")?;
    let scraper = StatsScraper::from_config(&config)?;

    eprintln!("⚾ Scraping {} table(s) from {}", categories.len(), site);

    let mut tables = BTreeMap::new();
    for (category, table) in scraper.tables(&url, &categories).await {
        match &table {
            Some(t) => eprintln!("  ✅ {}: {} rows", category, t.len()),
            None => eprintln!("  ⚠️  {}: no data", category),
        }
        tables.insert(category.to_string(), table);
    }

    let output = ScrapeOutput { url, site, tables };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
