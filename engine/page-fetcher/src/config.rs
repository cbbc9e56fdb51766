//! Configuration for page fetching

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FetchError, Result};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "BASEBALL_SCRAPER_";

/// Which renderer backs the fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Plain HTTP GET, no script execution
    Http,
    /// Headless Chromium, executes page scripts
    Chromium,
}

impl std::str::FromStr for RendererKind {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "chromium" | "chrome" | "browser" => Ok(Self::Chromium),
            other => Err(FetchError::config(format!("unknown renderer kind '{other}'"))),
        }
    }
}

/// Configuration for the page fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Renderer used on cache misses
    pub renderer: RendererKind,

    /// How long a fetched page stays servable from the cache
    pub cache_ttl_secs: u64,

    /// Upper bound on browser navigation
    pub navigation_timeout_ms: u64,

    /// Upper bound on waiting for the readiness signal after navigation
    pub wait_timeout_ms: u64,

    /// Request timeout for the HTTP renderer
    pub http_timeout_secs: u64,

    /// User agent sent by the HTTP renderer
    pub user_agent: String,

    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            renderer: if cfg!(feature = "browser") {
                RendererKind::Chromium
            } else {
                RendererKind::Http
            },
            cache_ttl_secs: 60 * 60, // 1 hour
            navigation_timeout_ms: 30_000,
            wait_timeout_ms: 30_000,
            http_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
            chrome_executable: None,
        }
    }
}

impl FetcherConfig {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(kind) = env_var("RENDERER") {
            config.renderer = kind.parse()?;
        }

        if let Some(ttl) = env_var("CACHE_TTL_SECS") {
            config.cache_ttl_secs = parse_number("CACHE_TTL_SECS", &ttl)?;
        }

        if let Some(ms) = env_var("NAVIGATION_TIMEOUT_MS") {
            config.navigation_timeout_ms = parse_number("NAVIGATION_TIMEOUT_MS", &ms)?;
        }

        if let Some(ms) = env_var("WAIT_TIMEOUT_MS") {
            config.wait_timeout_ms = parse_number("WAIT_TIMEOUT_MS", &ms)?;
        }

        if let Some(secs) = env_var("HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = parse_number("HTTP_TIMEOUT_SECS", &secs)?;
        }

        if let Some(agent) = env_var("USER_AGENT") {
            config.user_agent = agent;
        }

        if let Some(path) = env_var("CHROME_EXECUTABLE") {
            config.chrome_executable = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs == 0 {
            return Err(FetchError::config("cache_ttl_secs must be greater than 0"));
        }

        if self.navigation_timeout_ms == 0 || self.wait_timeout_ms == 0 {
            return Err(FetchError::config("browser timeouts must be greater than 0"));
        }

        if self.http_timeout_secs == 0 {
            return Err(FetchError::config("http_timeout_secs must be greater than 0"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(FetchError::config("user_agent must not be empty"));
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}")).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| FetchError::config(format!("{ENV_PREFIX}{name} must be a number, got '{raw}'")))
}
