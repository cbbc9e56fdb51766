//! Cache-first page fetching

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{Fingerprint, PageCache};
use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};
use crate::renderer::{self, Renderer, WaitFor};

/// Fetches pages through a renderer, serving repeats from a [`PageCache`].
///
/// A miss takes a per-fingerprint lock before rendering, so concurrent
/// requests for the same page render it once and the rest read the cache.
pub struct PageFetcher {
    renderer: Arc<dyn Renderer>,
    cache: Arc<PageCache>,
    in_flight: DashMap<Fingerprint, Arc<Mutex<()>>>,
}

impl PageFetcher {
    pub fn new(renderer: Arc<dyn Renderer>, cache: Arc<PageCache>) -> Self {
        Self { renderer, cache, in_flight: DashMap::new() }
    }

    /// Build the configured renderer and a fresh cache
    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        config.validate()?;
        let renderer = renderer::from_config(config)?;
        Ok(Self::new(renderer, Arc::new(PageCache::new(config.cache_ttl()))))
    }

    pub fn cache(&self) -> &Arc<PageCache> {
        &self.cache
    }

    /// Return the HTML for `url`, rendering it only if the cache has no live copy
    pub async fn fetch(&self, url: &str, wait: &WaitFor) -> Result<Arc<str>> {
        let fingerprint = Fingerprint::new(url);

        if let Some(html) = self.cache.get(&fingerprint) {
            debug!("Cache hit: {}", fingerprint);
            return Ok(html);
        }

        // Declared before the held lock so it is dropped after it
        let slot = InFlight::join(&self.in_flight, &fingerprint);
        let _held = slot.lock.lock().await;

        // Another task may have stored it while we waited for the lock
        if let Some(html) = self.cache.get(&fingerprint) {
            debug!("Cache hit after wait: {}", fingerprint);
            return Ok(html);
        }

        debug!("Cache miss: {}", fingerprint);
        self.render_and_store(&fingerprint, url, wait).await
    }

    async fn render_and_store(
        &self,
        fingerprint: &Fingerprint,
        url: &str,
        wait: &WaitFor,
    ) -> Result<Arc<str>> {
        let page = self.renderer.render(url, wait).await?;

        if page.html.trim().is_empty() {
            return Err(FetchError::EmptyDocument(url.to_string()));
        }

        let html: Arc<str> = page.html.into();
        if page.complete {
            self.cache.put(fingerprint.clone(), Arc::clone(&html));
            info!("Cached {} ({} bytes) via {}", fingerprint, html.len(), self.renderer.name());
        } else {
            warn!("Partial render of {} returned without caching", fingerprint);
        }

        Ok(html)
    }
}

/// A caller's share of the per-fingerprint lock. Dropping the last share
/// removes the map entry, including when the fetch future is cancelled.
struct InFlight<'a> {
    map: &'a DashMap<Fingerprint, Arc<Mutex<()>>>,
    fingerprint: &'a Fingerprint,
    lock: Arc<Mutex<()>>,
}

impl<'a> InFlight<'a> {
    fn join(map: &'a DashMap<Fingerprint, Arc<Mutex<()>>>, fingerprint: &'a Fingerprint) -> Self {
        let lock = map.entry(fingerprint.clone()).or_default().clone();
        Self { map, fingerprint, lock }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        drop(std::mem::take(&mut self.lock));
        self.map.remove_if(self.fingerprint, |_, lock| Arc::strong_count(lock) == 1);
    }
}
