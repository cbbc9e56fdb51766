//! Chromium-based renderer using chromiumoxide.
//!
//! Every render launches its own headless browser and shuts it down before
//! returning, whether navigation succeeded, timed out or failed.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use super::{RenderedPage, Renderer, WaitFor};
use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};

/// How often a selector wait re-checks the DOM
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How often a network-idle wait samples the page's resource count
const NETWORK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The resource count must hold still this long for the network to count as idle
const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Resources requested so far, or -1 while the document is still loading
const RESOURCE_COUNT_SCRIPT: &str =
    "document.readyState === 'complete' ? performance.getEntriesByType('resource').length : -1";

/// Upper bound on reading the DOM once waiting is over
const CONTENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Headless Chromium renderer
pub struct ChromiumRenderer {
    executable: Option<PathBuf>,
    navigation_timeout: Duration,
    wait_timeout: Duration,
}

impl ChromiumRenderer {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            executable: config.chrome_executable.clone(),
            navigation_timeout: config.navigation_timeout(),
            wait_timeout: config.wait_timeout(),
        }
    }

    fn browser_config(&self, url: &str) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.navigation_timeout)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");

        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| FetchError::unavailable(url, format!("failed to build browser config: {e}")))
    }

    /// Navigate, wait for readiness and read the DOM. The browser is owned
    /// and torn down by the caller.
    async fn load(&self, browser: &Browser, url: &str, wait: &WaitFor) -> Result<RenderedPage> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::unavailable(url, format!("failed to create new page: {e}")))?;

        let navigated = match timeout(self.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                return Err(FetchError::unavailable(url, format!("navigation failed: {e}")));
            }
            Err(_) => {
                warn!(
                    "Navigation to {} timed out after {:?}, keeping partial content",
                    url, self.navigation_timeout
                );
                false
            }
        };

        let ready = navigated && self.wait_until_ready(&page, url, wait).await;

        let html = match timeout(CONTENT_TIMEOUT, page.content()).await {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                return Err(FetchError::unavailable(url, format!("failed to read page content: {e}")));
            }
            Err(_) => return Err(FetchError::unavailable(url, "timed out reading page content")),
        };

        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", url, e);
        }

        Ok(RenderedPage { html, complete: ready })
    }

    async fn wait_until_ready(&self, page: &Page, url: &str, wait: &WaitFor) -> bool {
        match wait {
            WaitFor::NetworkIdle => match timeout(self.wait_timeout, wait_for_network_quiet(page)).await {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    warn!("Waiting for {} to settle failed: {}", url, e);
                    false
                }
                Err(_) => {
                    warn!("{} did not settle within {:?}", url, self.wait_timeout);
                    false
                }
            },
            WaitFor::Selector(selector) => {
                let deadline = Instant::now() + self.wait_timeout;
                loop {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        warn!(
                            "Element '{}' did not appear on {} within {:?}",
                            selector, url, self.wait_timeout
                        );
                        return false;
                    }

                    if let Ok(Ok(_)) = timeout(remaining, page.find_element(selector.as_str())).await {
                        debug!("Element '{}' present on {}", selector, url);
                        return true;
                    }

                    tokio::time::sleep(SELECTOR_POLL_INTERVAL.min(remaining)).await;
                }
            }
        }
    }
}

/// Resolve once the document has loaded and no new resource has been
/// requested for [`NETWORK_QUIET_WINDOW`]
async fn wait_for_network_quiet(page: &Page) -> std::result::Result<(), String> {
    let mut last_count = -1_i64;
    let mut quiet_since = Instant::now();

    loop {
        let count: i64 = page
            .evaluate(RESOURCE_COUNT_SCRIPT)
            .await
            .map_err(|e| e.to_string())?
            .into_value()
            .map_err(|e| e.to_string())?;

        if count < 0 || count != last_count {
            last_count = count;
            quiet_since = Instant::now();
        } else if quiet_since.elapsed() >= NETWORK_QUIET_WINDOW {
            return Ok(());
        }

        tokio::time::sleep(NETWORK_POLL_INTERVAL).await;
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(&self, url: &str, wait: &WaitFor) -> Result<RenderedPage> {
        let config = self.browser_config(url)?;

        info!("Rendering {} in headless Chromium", url);
        let started = Instant::now();

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::unavailable(url, format!("failed to launch Chromium: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let outcome = self.load(&browser, url, wait).await;

        // Tear down on every path before returning
        if let Err(e) = browser.close().await {
            warn!("Failed to close Chromium cleanly: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("Failed to reap Chromium process: {}", e);
        }
        handler_task.abort();

        match &outcome {
            Ok(page) => info!(
                "Rendered {} ({} bytes, complete: {}) in {:?}",
                url,
                page.html.len(),
                page.complete,
                started.elapsed()
            ),
            Err(e) => warn!("Rendering {} failed: {}", url, e),
        }

        outcome
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_takes_timeouts_from_config() {
        let config = FetcherConfig {
            navigation_timeout_ms: 5_000,
            wait_timeout_ms: 2_000,
            chrome_executable: Some(PathBuf::from("/opt/chrome/chrome")),
            ..Default::default()
        };
        let renderer = ChromiumRenderer::new(&config);
        assert_eq!(renderer.navigation_timeout, Duration::from_secs(5));
        assert_eq!(renderer.wait_timeout, Duration::from_secs(2));
        assert_eq!(renderer.executable, Some(PathBuf::from("/opt/chrome/chrome")));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_render_data_url_with_selector_wait() {
        let renderer = ChromiumRenderer::new(&FetcherConfig::default());
        let page = renderer
            .render(
                "data:text/html,<table id='t'><tr><th>A</th></tr><tr><td>1</td></tr></table>",
                &WaitFor::selector("#t"),
            )
            .await
            .expect("render failed");

        assert!(page.complete);
        assert!(page.html.contains("<table id=\"t\">"));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_network_idle_waits_past_the_load_event() {
        let renderer = ChromiumRenderer::new(&FetcherConfig::default());
        let html = "data:text/html,<p id='p'>before</p><script>\
            setTimeout(() => document.getElementById('p').textContent = 'after', 200)</script>";
        let page = renderer.render(html, &WaitFor::NetworkIdle).await.expect("render failed");

        assert!(page.complete);
        assert!(page.html.contains("after"));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_missing_selector_returns_partial_page() {
        let config = FetcherConfig { wait_timeout_ms: 500, ..Default::default() };
        let renderer = ChromiumRenderer::new(&config);
        let page = renderer
            .render("data:text/html,<p>loaded</p>", &WaitFor::selector("#never"))
            .await
            .expect("render failed");

        assert!(!page.complete);
        assert!(page.html.contains("loaded"));
    }
}
