//! Plain HTTP renderer using reqwest.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::{RenderedPage, Renderer, WaitFor};
use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};

/// Fetches server-rendered HTML. Scripts are not executed, so selector waits
/// are not honoured.
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Create a new HTTP renderer
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str, wait: &WaitFor) -> Result<RenderedPage> {
        if let WaitFor::Selector(selector) = wait {
            debug!("HTTP renderer cannot wait for '{}' on {}", selector, url);
        }

        info!("Fetching data from: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::unavailable(url, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FetchError::unavailable(
                url,
                format!("HTTP request failed with status: {}", response.status()),
            ));
        }

        let html = response.text().await?;
        info!("Successfully fetched HTML ({} bytes)", html.len());

        Ok(RenderedPage::complete(html))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
