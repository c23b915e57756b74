//! Bounded, time-limited response cache keyed by exact prompt text.

use jarvis_rs_config::CacheConfig;
use log::debug;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    inserted_at: Instant,
}

/// In-process answer cache.
///
/// An entry older than the TTL is never returned. Reads use `peek`, so the
/// LRU order is insertion order and a full cache drops its oldest insertion.
/// Expired entries are purged before a live entry is evicted.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, Duration::from_secs(config.ttl_secs))
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    /// Insert or overwrite an entry with a fresh expiry.
    pub fn put(&self, key: &str, value: &str) {
        self.insert_at(key, value, Instant::now());
    }

    /// Number of entries that have not expired.
    pub fn len(&self) -> usize {
        self.len_at(Instant::now())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) > self.ttl
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        let mut entries = self.entries.lock();
        let entry = entries.peek(key)?;
        if self.is_expired(entry, now) {
            entries.pop(key);
            debug!("cache entry expired (key_len={})", key.len());
            return None;
        }
        Some(entry.value.clone())
    }

    pub(crate) fn insert_at(&self, key: &str, value: &str, now: Instant) {
        let mut entries = self.entries.lock();
        if entries.len() == entries.cap().get() && !entries.contains(key) {
            let expired: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| self.is_expired(entry, now))
                .map(|(key, _)| key.clone())
                .collect();
            for stale in &expired {
                entries.pop(stale);
            }
            if !expired.is_empty() {
                debug!("cache purged expired entries (count={})", expired.len());
            }
        }
        let evicted = entries.push(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                inserted_at: now,
            },
        );
        if let Some((oldest, _)) = evicted.filter(|(evicted_key, _)| evicted_key != key) {
            debug!("cache evicted oldest entry (key_len={})", oldest.len());
        }
    }

    pub(crate) fn len_at(&self, now: Instant) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|(_, entry)| !self.is_expired(entry, now))
            .count()
    }
}
