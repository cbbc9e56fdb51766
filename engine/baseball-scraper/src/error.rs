//! Error types for table scraping
//!
//! Every variant is a "no data" outcome for one table. The `Option`-returning
//! methods on [`crate::StatsScraper`] log these and return `None`, so one
//! missing category never aborts a query over several.

use page_fetcher::FetchError;
use thiserror::Error;

/// Result type alias for scraping operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Why a table could not be produced
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The URL is not a page of the expected site or category
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The page could not be fetched or rendered
    #[error("Page unavailable: {0}")]
    Unavailable(String),

    /// The table (or its container) is not on the page
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The table markup could not be turned into rows
    #[error("Parse error: {0}")]
    Parse(String),

    /// The table had a header but no non-empty rows
    #[error("No rows extracted from {0}")]
    Empty(String),

    /// The scraper could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScrapeError {
    /// Create a new invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into(), reason: reason.into() }
    }

    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Markup problems are unexpected; everything else is a normal miss
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

impl From<FetchError> for ScrapeError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Config(msg) | FetchError::RendererUnavailable(msg) => Self::Config(msg),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_map_to_unavailable() {
        let err: ScrapeError = FetchError::unavailable("https://x", "timed out").into();
        assert!(matches!(err, ScrapeError::Unavailable(ref m) if m.contains("timed out")));

        let err: ScrapeError = FetchError::EmptyDocument("https://x".to_string()).into();
        assert!(matches!(err, ScrapeError::Unavailable(_)));
    }

    #[test]
    fn test_config_errors_stay_config() {
        let err: ScrapeError = FetchError::config("bad ttl").into();
        assert!(matches!(err, ScrapeError::Config(ref m) if m == "bad ttl"));
    }

    #[test]
    fn test_only_parse_errors_are_failures() {
        assert!(ScrapeError::parse("no header row").is_parse_failure());
        assert!(!ScrapeError::TableNotFound("table#x".to_string()).is_parse_failure());
        assert!(!ScrapeError::invalid_url("x", "y").is_parse_failure());
    }
}
