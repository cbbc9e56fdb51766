//! # Baseball Scraper
//!
//! Pulls statistics tables off public baseball pages:
//!
//! - baseball-reference player pages (standard batting / pitching)
//! - baseball-reference team-season pages (team batting / pitching)
//! - Baseball Savant player pages (percentiles, statcast summaries, batted
//!   ball profile, pitch tracking)
//!
//! [`PlayerLookup`] turns a player's name into those page URLs via the
//! Chadwick Bureau register.
//!
//! One extractor serves every table; each [`StatCategory`] only supplies a
//! [`TableSpec`] saying where the table is and how to read it. Missing tables
//! are a normal outcome (a pure batter has no pitching table), so the
//! `Option`-returning methods log and return `None` instead of failing.
//!
//! ```rust,no_run
//! use baseball_scraper::{FetcherConfig, StatsScraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = StatsScraper::from_config(&FetcherConfig::from_env()?)?;
//!     let url = "https://www.baseball-reference.com/players/a/aaronha01.shtml";
//!     if let Some(batting) = scraper.batting_stats(url).await {
//!         println!("{} seasons", batting.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod category;
pub mod error;
pub mod extract;
pub mod locator;
pub mod lookup;
pub mod scrape;
pub mod site;
pub mod table;


pub use category::StatCategory;
pub use error::{Result, ScrapeError};
pub use extract::{ExtractStrategy, TableSpec};
pub use locator::TableLocator;
pub use lookup::{PlayerLookup, PlayerRecord, PlayerRegister};
pub use scrape::StatsScraper;
pub use site::{player_url, savant_player_url, team_url, Site};
pub use table::{StatRow, StatTable};

/// Re-export the fetch layer for callers building their own scraper
pub use page_fetcher::{FetcherConfig, PageCache, PageFetcher, RendererKind, WaitFor};
