/*!
 * Provider implementations for machine-translation services.
 *
 * This module contains client implementations for the supported providers:
 * - Google: Google Cloud Translation v2
 * - DeepL: DeepL API v2
 * - Mock: scripted provider for tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One language a provider can translate into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Language code, e.g. "es"
    pub code: String,
    /// Human-readable name, e.g. "Spanish"
    pub name: String,
}

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must
/// follow, allowing them to be used interchangeably by the translation
/// service. Implementations are expected to be fallible and possibly slow;
/// recovery policy (fail-open per string) lives above this trait, not in it.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate a single string
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `source` - Source language code
    /// * `target` - Target language code
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError>;

    /// List the languages this provider can translate into
    async fn supported_languages(&self) -> Result<Vec<Language>, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}

pub mod google;
pub mod deepl;
pub mod mock;
