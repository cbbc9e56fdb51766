//! The public scraping entry point

use page_fetcher::{FetcherConfig, PageFetcher, WaitFor};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::category::StatCategory;
use crate::error::{Result, ScrapeError};
use crate::extract::TableSpec;
use crate::site::{self, Site};
use crate::table::StatTable;

/// Extracts statistics tables from baseball-reference and Baseball Savant pages.
///
/// Pages are fetched through a [`PageFetcher`], so asking for several tables
/// from one page costs one fetch while the cached copy is live.
pub struct StatsScraper {
    fetcher: PageFetcher,
}

impl StatsScraper {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Build a scraper with the configured renderer and a fresh page cache
    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        Ok(Self::new(PageFetcher::from_config(config)?))
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Extract one table, or `None` if the page does not have it. The reason
    /// for a `None` is logged.
    pub async fn table(&self, url: &str, category: StatCategory) -> Option<StatTable> {
        no_data_as_none(url, category, self.try_table(url, category).await)
    }

    /// Extract one table, reporting why nothing could be extracted
    pub async fn try_table(&self, url: &str, category: StatCategory) -> Result<StatTable> {
        let site = site_for(url, category)?;
        self.try_table_with(url, &category.table_spec(), &site.wait_condition()).await
    }

    /// Extract a table described by a caller-supplied spec from any http(s) page
    pub async fn try_table_with(&self, url: &str, spec: &TableSpec, wait: &WaitFor) -> Result<StatTable> {
        site::parse_http_url(url)?;

        let html = self.fetcher.fetch(url, wait).await?;
        extract_logged(url, spec, &html)
    }

    /// Extract several tables from one page. A missing category yields
    /// `None` in its slot and does not stop the others.
    ///
    /// The page is fetched once per call and shared by every category, even
    /// when the render was partial and therefore not cached.
    pub async fn tables(
        &self,
        url: &str,
        categories: &[StatCategory],
    ) -> Vec<(StatCategory, Option<StatTable>)> {
        let mut page: Option<Arc<str>> = None;
        let mut results = Vec::with_capacity(categories.len());

        for &category in categories {
            let outcome = match site_for(url, category) {
                Err(e) => Err(e),
                Ok(site) => {
                    let fetched = match page.take() {
                        Some(html) => Ok(html),
                        None => self.fetcher.fetch(url, &site.wait_condition()).await,
                    };
                    match fetched {
                        Ok(html) => {
                            let table = extract_logged(url, &category.table_spec(), &html);
                            page = Some(html);
                            table
                        }
                        Err(e) => Err(e.into()),
                    }
                }
            };
            results.push((category, no_data_as_none(url, category, outcome)));
        }
        results
    }

    /// Standard batting table of a baseball-reference player page
    pub async fn batting_stats(&self, url: &str) -> Option<StatTable> {
        self.table(url, StatCategory::PlayerBatting).await
    }

    /// Standard pitching table of a baseball-reference player page
    pub async fn pitching_stats(&self, url: &str) -> Option<StatTable> {
        self.table(url, StatCategory::PlayerPitching).await
    }

    pub async fn team_batting_stats(&self, url: &str) -> Option<StatTable> {
        self.table(url, StatCategory::TeamBatting).await
    }

    pub async fn team_pitching_stats(&self, url: &str) -> Option<StatTable> {
        self.table(url, StatCategory::TeamPitching).await
    }

    pub async fn savant_percentile_stats(&self, url: &str) -> Option<StatTable> {
        self.table(url, StatCategory::SavantPercentiles).await
    }

    /// Statcast pitching summary, MLB average row removed
    pub async fn savant_pitching_stats(&self, url: &str) -> Option<StatTable> {
        self.table(url, StatCategory::SavantStatcastPitching).await
    }

    /// Statcast batting summary, MLB average row removed
    pub async fn savant_batting_stats(&self, url: &str) -> Option<StatTable> {
        self.table(url, StatCategory::SavantStatcastBatting).await
    }

    pub async fn savant_batted_ball_profile(&self, url: &str) -> Option<StatTable> {
        self.table(url, StatCategory::SavantBattedBallProfile).await
    }

    /// Per-pitch-type results
    pub async fn savant_pitch_tracking(&self, url: &str) -> Option<StatTable> {
        self.table(url, StatCategory::SavantPitchTracking).await
    }
}

/// Classify `url` and check the category's tables live on that kind of page
fn site_for(url: &str, category: StatCategory) -> Result<Site> {
    let site = Site::classify(url)?;
    if site != category.site() {
        return Err(ScrapeError::invalid_url(
            url,
            format!("{category} tables are on a {}, not a {site}", category.site()),
        ));
    }
    Ok(site)
}

fn extract_logged(url: &str, spec: &TableSpec, html: &str) -> Result<StatTable> {
    let table = spec.extract(html)?;
    info!("Extracted {} rows x {} columns ({}) from {}", table.len(), table.columns().len(), spec.locator, url);
    Ok(table)
}

fn no_data_as_none(url: &str, category: StatCategory, outcome: Result<StatTable>) -> Option<StatTable> {
    match outcome {
        Ok(table) => Some(table),
        Err(e) if e.is_parse_failure() => {
            error!("Error parsing {} table from {}: {}", category, url, e);
            None
        }
        Err(e) => {
            warn!("No {} data for {}: {}", category, url, e);
            None
        }
    }
}
