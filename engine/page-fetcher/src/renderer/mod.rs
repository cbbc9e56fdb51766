//! Renderer abstraction for turning a URL into HTML.
//!
//! Defines the `Renderer` trait that abstracts over how a page is obtained:
//! a plain HTTP GET for server-rendered pages, or a headless Chromium for
//! pages whose tables are filled in by script.

#[cfg(feature = "browser")]
pub mod chromium;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{FetcherConfig, RendererKind};
use crate::error::Result;

/// Readiness signal to wait for after navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitFor {
    /// Wait until the page has loaded and stopped requesting resources
    NetworkIdle,
    /// Wait until an element matching this CSS selector exists
    Selector(String),
}

impl WaitFor {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector(selector.into())
    }
}

/// HTML produced by a renderer
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    /// False when the readiness wait timed out and `html` is whatever was
    /// present at that moment
    pub complete: bool,
}

impl RenderedPage {
    pub fn complete(html: impl Into<String>) -> Self {
        Self { html: html.into(), complete: true }
    }

    pub fn partial(html: impl Into<String>) -> Self {
        Self { html: html.into(), complete: false }
    }
}

/// Something that can produce the HTML of a URL
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Fetch `url` and return its HTML. A readiness timeout yields a partial
    /// page; only a total failure is an error.
    async fn render(&self, url: &str, wait: &WaitFor) -> Result<RenderedPage>;

    /// Short name for log lines
    fn name(&self) -> &'static str;
}

/// Build the renderer selected by `config`
pub fn from_config(config: &FetcherConfig) -> Result<Arc<dyn Renderer>> {
    match config.renderer {
        RendererKind::Http => Ok(Arc::new(http::HttpRenderer::new(config)?)),
        #[cfg(feature = "browser")]
        RendererKind::Chromium => Ok(Arc::new(chromium::ChromiumRenderer::new(config))),
        #[cfg(not(feature = "browser"))]
        RendererKind::Chromium => Err(crate::error::FetchError::RendererUnavailable(
            "chromium renderer requires the `browser` feature".to_string(),
        )),
    }
}
