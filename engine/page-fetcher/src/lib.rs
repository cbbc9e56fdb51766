//! # Page Fetcher
//!
//! Fetches the HTML of public statistics pages and keeps a time-boxed copy of
//! each page so repeated extractions from one page cost a single fetch.
//!
//! ## Architecture
//!
//! - **Renderer**: trait over how a page is obtained (plain HTTP, or headless
//!   Chromium for pages whose tables are built by script)
//! - **PageCache**: fingerprint -> HTML map with a fixed TTL, evicted by age
//! - **PageFetcher**: cache-first fetch, serialized per fingerprint
//!
//! ## Usage
//!
//! ```rust,no_run
//! use page_fetcher::{FetcherConfig, PageFetcher, WaitFor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = PageFetcher::from_config(&FetcherConfig::from_env()?)?;
//!     let html = fetcher
//!         .fetch("https://www.baseball-reference.com/teams/CLE/2017.shtml", &WaitFor::NetworkIdle)
//!         .await?;
//!     println!("{} bytes", html.len());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod renderer;

pub use cache::{Clock, Fingerprint, ManualClock, PageCache, SystemClock};
pub use config::{FetcherConfig, RendererKind};
pub use error::{FetchError, Result};
pub use fetcher::PageFetcher;
pub use renderer::{RenderedPage, Renderer, WaitFor};

/// Re-exported so downstream renderers can implement the trait
pub use async_trait::async_trait;
