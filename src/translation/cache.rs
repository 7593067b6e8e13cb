/*!
 * Translation caching functionality.
 *
 * Identical strings recur constantly across entries (button labels,
 * category names, boilerplate), so provider responses are cached per
 * (text, source, target) triple for the lifetime of the process.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use parking_lot::RwLock;

/// Cache key combining source text, source locale, and target locale
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source_text: String,
    source_locale: String,
    target_locale: String,
}

/// In-memory translation cache with hit/miss accounting
pub struct TranslationCache {
    entries: RwLock<HashMap<CacheKey, String>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    enabled: bool,
}

impl TranslationCache {
    /// Create a new translation cache
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            enabled,
        }
    }

    /// Get a cached translation, counting the hit or miss
    pub fn get(&self, text: &str, source: &str, target: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey {
            source_text: text.to_string(),
            source_locale: source.to_string(),
            target_locale: target.to_string(),
        };

        let cached = self.entries.read().get(&key).cloned();
        match cached {
            Some(translation) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Translation cache hit ({} -> {})", source, target);
                Some(translation)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a translation
    pub fn insert(&self, text: &str, source: &str, target: &str, translation: &str) {
        if !self.enabled {
            return;
        }

        let key = CacheKey {
            source_text: text.to_string(),
            source_locale: source.to_string(),
            target_locale: target.to_string(),
        };
        self.entries.write().insert(key, translation.to_string());
    }

    /// (hits, misses) so far
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Number of cached translations
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds nothing
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop all cached translations and reset counters
    pub fn clear(&self) {
        self.entries.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}
