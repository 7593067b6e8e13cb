/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService, which applies a translation
 * provider across single strings, batches of strings, and whole entries.
 *
 * Translation is fail-open per string: a provider error degrades that one
 * string to its original text instead of aborting the batch. Structural
 * operations never inherit this policy - it applies to text only.
 */

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::join_all;
use log::{error, warn};
use serde_json::{Map, Value};

use crate::providers::{Language, TranslationProvider};
use crate::store::model::{CollectionSchema, Entry};
use crate::translation::cache::TranslationCache;
use crate::translation::fields::translatable_fields;

/// Translation service applying a provider across strings and entries
#[derive(Clone)]
pub struct TranslationService {
    /// Provider implementation
    provider: Arc<dyn TranslationProvider>,

    /// Cache of provider responses
    cache: Arc<TranslationCache>,
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl TranslationService {
    /// Create a new translation service with the given provider
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider,
            cache: Arc::new(TranslationCache::default()),
        }
    }

    /// Create a service with caching disabled
    pub fn without_cache(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider,
            cache: Arc::new(TranslationCache::new(false)),
        }
    }

    /// Cache statistics as (hits, misses)
    pub fn cache_stats(&self) -> (usize, usize) {
        self.cache.stats()
    }

    /// Translate a single string.
    ///
    /// Empty text or a missing target locale is a no-op, not an error. On
    /// provider failure the original text is returned unchanged, so one bad
    /// string never blocks an entire entry.
    pub async fn translate_text(&self, text: &str, source: &str, target: &str) -> String {
        if text.is_empty() || target.is_empty() {
            return text.to_string();
        }

        if let Some(cached) = self.cache.get(text, source, target) {
            return cached;
        }

        match self.provider.translate(text, source, target).await {
            Ok(translated) => {
                self.cache.insert(text, source, target, &translated);
                translated
            }
            Err(e) => {
                error!("Translation error: {}", e);
                text.to_string()
            }
        }
    }

    /// Translate a batch of strings concurrently, preserving order.
    ///
    /// Each string is independently fail-open; the output always has the
    /// same length as the input.
    pub async fn translate_texts(&self, texts: &[String], source: &str, target: &str) -> Vec<String> {
        join_all(texts.iter().map(|text| self.translate_text(text, source, target))).await
    }

    /// Translate one entry against its collection schema.
    ///
    /// Produces a copy of the entry with every translatable field replaced:
    /// plain strings are translated directly, nested structured-text objects
    /// field by field, recursively. Arrays and non-text values pass through
    /// unchanged, as do identifiers and relational fields - stripping
    /// store-managed fields is the caller's job, not this one's.
    pub async fn translate_entry(
        &self,
        entry: &Entry,
        schema: &CollectionSchema,
        source: &str,
        target: &str,
    ) -> Entry {
        let mut translated = entry.clone();

        for field in translatable_fields(schema) {
            let Some(value) = entry.fields.get(&field) else {
                continue;
            };
            match value {
                Value::String(text) if !text.is_empty() => {
                    let replacement = self.translate_text(text, source, target).await;
                    translated.fields.insert(field, Value::String(replacement));
                }
                Value::Object(nested) => {
                    let replacement = self.translate_map(nested, source, target).await;
                    translated.fields.insert(field, Value::Object(replacement));
                }
                // Arrays and scalar non-text values pass through untouched
                _ => {}
            }
        }

        translated
    }

    /// Translate every key of a structured-text object, recursing into
    /// nested objects. Depth is bounded by the nesting present in the data.
    fn translate_map<'a>(
        &'a self,
        map: &'a Map<String, Value>,
        source: &'a str,
        target: &'a str,
    ) -> Pin<Box<dyn Future<Output = Map<String, Value>> + Send + 'a>> {
        Box::pin(async move {
            let mut translated = map.clone();

            for (key, value) in map {
                match value {
                    Value::String(text) if !text.is_empty() => {
                        let replacement = self.translate_text(text, source, target).await;
                        translated.insert(key.clone(), Value::String(replacement));
                    }
                    Value::Object(nested) => {
                        let replacement = self.translate_map(nested, source, target).await;
                        translated.insert(key.clone(), Value::Object(replacement));
                    }
                    _ => {}
                }
            }

            translated
        })
    }

    /// Languages the provider supports. Degrades to an empty list on
    /// provider failure - listings are informational, never load-bearing.
    pub async fn supported_languages(&self) -> Vec<Language> {
        match self.provider.supported_languages().await {
            Ok(languages) => languages,
            Err(e) => {
                warn!("Error fetching provider languages: {}", e);
                Vec::new()
            }
        }
    }

    /// Test the connection to the provider
    pub async fn test_connection(&self) -> anyhow::Result<()> {
        self.provider.test_connection().await
            .map_err(|e| anyhow::anyhow!("Failed to connect to {} provider: {}", self.provider.name(), e))
    }
}
