//! Player id lookup against the Chadwick Bureau register
//!
//! The register maps every person in professional baseball to their ids on
//! other sites. It is published as sixteen CSV shards (`people-0.csv` to
//! `people-f.csv`); [`PlayerLookup`] downloads them once and searches them by
//! name, so a caller can go from "Jose Ramirez" to a page URL.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::{Result, ScrapeError};
use crate::site;

pub const REGISTER_BASE_URL: &str = "https://raw.githubusercontent.com/chadwickbureau/register/master/data";

/// Shard suffixes of `people-<x>.csv`
const REGISTER_SHARDS: &str = "0123456789abcdef";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// One person in the register, reduced to names, ids and MLB years
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name_last: String,
    pub name_first: String,
    pub key_bbref: Option<String>,
    pub key_mlbam: Option<u32>,
    pub mlb_played_first: Option<u16>,
    pub mlb_played_last: Option<u16>,
}

impl PlayerRecord {
    /// baseball-reference profile page, if the person has a key there
    pub fn player_url(&self) -> Option<String> {
        self.key_bbref.as_deref().and_then(|key| site::player_url(key).ok())
    }

    /// Baseball Savant player page, if the person has an MLBAM id
    pub fn savant_url(&self) -> Option<String> {
        let id = self.key_mlbam?;
        site::savant_player_url(&self.name_last, &self.name_first, &id.to_string()).ok()
    }

    fn matches(&self, last: &str, first: Option<&str>) -> bool {
        self.name_last.trim().to_lowercase() == last
            && first.map_or(true, |first| self.name_first.trim().to_lowercase() == first)
    }
}

/// The loaded register
#[derive(Debug, Clone, Default)]
pub struct PlayerRegister {
    records: Vec<PlayerRecord>,
}

impl PlayerRegister {
    /// Load one CSV shard
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut register = Self::default();
        register.extend_from_reader(rdr)?;
        Ok(register)
    }

    /// Append the people in a CSV shard. Rows that do not deserialize are
    /// logged and skipped; a shard without the expected header is an error.
    pub fn extend_from_reader<R: Read>(&mut self, rdr: R) -> Result<usize> {
        let mut reader = csv::Reader::from_reader(rdr);

        let headers = reader
            .headers()
            .map_err(|e| ScrapeError::parse(format!("unreadable register header: {e}")))?;
        if !headers.iter().any(|h| h == "name_last") || !headers.iter().any(|h| h == "key_bbref") {
            return Err(ScrapeError::parse("register header lacks name_last/key_bbref columns"));
        }

        let before = self.records.len();
        for result in reader.deserialize::<PlayerRecord>() {
            match result {
                Ok(record) => self.records.push(record),
                Err(e) => warn!("Skipping register row: {}", e),
            }
        }
        Ok(self.records.len() - before)
    }

    /// People with this last name, and first name when given. Case is ignored.
    pub fn search(&self, last: &str, first: Option<&str>) -> Vec<&PlayerRecord> {
        let last = last.trim().to_lowercase();
        let first = first.map(|f| f.trim().to_lowercase());
        self.records
            .iter()
            .filter(|record| record.matches(&last, first.as_deref()))
            .collect()
    }

    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Downloads the register on first use and answers name searches from it
pub struct PlayerLookup {
    client: Client,
    base_url: String,
    register: OnceCell<Arc<PlayerRegister>>,
}

impl PlayerLookup {
    /// Create a lookup reading the public register
    pub fn new() -> Result<Self> {
        Self::with_base_url(REGISTER_BASE_URL)
    }

    /// Create a lookup reading `people-*.csv` shards from another location
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent("baseball-scraper")
            .build()
            .map_err(|e| ScrapeError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            register: OnceCell::new(),
        })
    }

    /// Look a player up by last name and optional first name, ignoring case
    pub async fn search(&self, last: &str, first: Option<&str>) -> Result<Vec<PlayerRecord>> {
        let register = self.register().await?;
        Ok(register.search(last, first).into_iter().cloned().collect())
    }

    /// The full register, downloaded on the first call
    pub async fn register(&self) -> Result<Arc<PlayerRegister>> {
        self.register
            .get_or_try_init(|| async { self.download().await.map(Arc::new) })
            .await
            .cloned()
    }

    async fn download(&self) -> Result<PlayerRegister> {
        info!("Gathering player lookup table from {}", self.base_url);

        let mut register = PlayerRegister::default();
        for shard in REGISTER_SHARDS.chars() {
            let url = format!("{}/people-{shard}.csv", self.base_url);

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| ScrapeError::Unavailable(format!("{url}: {e}")))?;
            if !response.status().is_success() {
                return Err(ScrapeError::Unavailable(format!(
                    "{url}: HTTP request failed with status: {}",
                    response.status()
                )));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| ScrapeError::Unavailable(format!("{url}: {e}")))?;
            let added = register.extend_from_reader(body.as_ref())?;
            info!("Loaded {} people from {}", added, url);
        }

        info!("Player register ready ({} people)", register.len());
        Ok(register)
    }
}
