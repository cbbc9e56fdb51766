//! Time-boxed page cache
//!
//! Maps a page fingerprint to the rendered HTML and the time it was fetched.
//! Entries are evicted by age only: a lookup never returns an entry older than
//! the configured TTL, and expired entries are dropped when observed or when
//! [`PageCache::purge_expired`] runs.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Identifies one remote document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a URL. Surrounding whitespace and a trailing `#fragment`
    /// do not change the document, so they are not part of the key.
    pub fn new(url: &str) -> Self {
        let url = url.trim();
        let url = url.split_once('#').map_or(url, |(doc, _)| doc);
        Self(url.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// Source of wall-clock time for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used to drive expiry in tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap_or(chrono::Duration::MAX);
        let mut now = self.now.lock();
        *now = now.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A cached page
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub html: Arc<str>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn age(&self, now: DateTime<Utc>) -> Duration {
        // A clock that moved backwards yields a zero age, not a negative one
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Process-local page cache with a fixed time-to-live
pub struct PageCache {
    entries: DashMap<Fingerprint, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl PageCache {
    /// Create a cache backed by the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache reading time from `clock`
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { entries: DashMap::new(), ttl, clock }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a page. Misses and expired entries both return `None`.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<str>> {
        let now = self.clock.now();
        let expired = {
            let entry = self.entries.get(fingerprint)?;
            if entry.age(now) < self.ttl {
                return Some(Arc::clone(&entry.html));
            }
            entry.fetched_at
        };

        // Only remove the entry we judged expired, not one stored since
        self.entries.remove_if(fingerprint, |_, entry| entry.fetched_at == expired);
        debug!("Cache entry expired: {}", fingerprint);
        None
    }

    /// Store a page, stamped with the current time
    pub fn put(&self, fingerprint: Fingerprint, html: impl Into<Arc<str>>) {
        let entry = CacheEntry { html: html.into(), fetched_at: self.clock.now() };
        self.entries.insert(fingerprint, entry);
    }

    /// Time the page was stored, if it is still live
    pub fn fetched_at(&self, fingerprint: &Fingerprint) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.entries
            .get(fingerprint)
            .filter(|entry| entry.age(now) < self.ttl)
            .map(|entry| entry.fetched_at)
    }

    /// Drop one page regardless of age
    pub fn invalidate(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.remove(fingerprint).is_some()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.age(now) < self.ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("Purged {} expired cache entries", removed);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    fn cache() -> (PageCache, ManualClock) {
        let clock = ManualClock::default();
        (PageCache::with_clock(TTL, Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_fingerprint_ignores_fragment_and_whitespace() {
        let a = Fingerprint::new(" https://example.com/page.shtml#batting ");
        let b = Fingerprint::new("https://example.com/page.shtml");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://example.com/page.shtml");
    }

    #[test]
    fn test_fingerprint_keeps_query() {
        let a = Fingerprint::new("https://example.com/p?stats=hitting");
        let b = Fingerprint::new("https://example.com/p?stats=pitching");
        assert_ne!(a, b);
    }

    #[test]
    fn test_get_miss() {
        let (cache, _) = cache();
        assert!(cache.get(&Fingerprint::new("https://example.com")).is_none());
    }

    #[test]
    fn test_put_then_get_within_ttl() {
        let (cache, clock) = cache();
        let fp = Fingerprint::new("https://example.com");
        cache.put(fp.clone(), "<html>1</html>");

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(&fp).as_deref(), Some("<html>1</html>"));
    }

    #[test]
    fn test_entry_never_served_at_or_past_ttl() {
        let (cache, clock) = cache();
        let fp = Fingerprint::new("https://example.com");
        cache.put(fp.clone(), "<html></html>");

        clock.advance(TTL);
        assert!(cache.get(&fp).is_none());
        // Expired entries are removed on observation
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_refreshes_timestamp() {
        let (cache, clock) = cache();
        let fp = Fingerprint::new("https://example.com");
        cache.put(fp.clone(), "old");
        clock.advance(Duration::from_secs(50));
        cache.put(fp.clone(), "new");
        clock.advance(Duration::from_secs(50));

        assert_eq!(cache.get(&fp).as_deref(), Some("new"));
        assert_eq!(cache.fetched_at(&fp), Some(clock.now() - chrono::Duration::seconds(50)));
    }

    #[test]
    fn test_purge_expired_is_by_age_not_access() {
        let (cache, clock) = cache();
        cache.put(Fingerprint::new("https://a.example"), "a");
        clock.advance(Duration::from_secs(30));
        cache.put(Fingerprint::new("https://b.example"), "b");

        // Reading "a" does not extend its life
        assert!(cache.get(&Fingerprint::new("https://a.example")).is_some());
        clock.advance(Duration::from_secs(31));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&Fingerprint::new("https://b.example")).is_some());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let (cache, _) = cache();
        let fp = Fingerprint::new("https://a.example");
        cache.put(fp.clone(), "a");
        cache.put(Fingerprint::new("https://b.example"), "b");

        assert!(cache.invalidate(&fp));
        assert!(!cache.invalidate(&fp));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
