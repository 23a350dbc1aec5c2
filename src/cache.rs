//! In-memory translation cache with per-entry expiry.
//!
//! Expired entries are dropped lazily when read, and swept in bulk whenever a
//! write leaves the store holding an exact multiple of [`SWEEP_INTERVAL`]
//! entries. Nothing is persisted; every instance starts empty.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const SWEEP_INTERVAL: usize = 100;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Thread-safe translation cache. Share it behind an `Arc`.
#[derive(Debug)]
pub struct TranslationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl TranslationCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Cache key for a source text under an engine.
    pub fn key(engine: &str, text: &str) -> String {
        format!("{}:{}", engine, text)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        entries.insert(
            key.into(),
            CacheEntry {
                value: value.into(),
                expires_at: now.checked_add(ttl),
            },
        );

        if entries.len() % SWEEP_INTERVAL == 0 {
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(now));
            debug!("Cache sweep removed {} expired entries", before - entries.len());
        }
    }

    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Physical entry count, including expired entries not yet evicted.
    pub fn size(&self) -> usize {
        self.entries.lock().len()
    }
}
