use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source locale code (the store's default language)
    pub source_locale: String,

    /// Target locale codes to replicate into
    pub target_locales: Vec<String>,

    /// Content store connection
    pub store: StoreConfig,

    /// Translation config
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProviderKind {
    #[default]
    Google,
    DeepL,
    Mock,
}

impl TranslationProviderKind {
    /// Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::DeepL => "DeepL",
            Self::Mock => "Mock",
        }
    }

    /// Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::DeepL => "deepl".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "deepl" => Ok(Self::DeepL),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Content store connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// Base URL of the store API
    pub endpoint: String,

    /// Bearer token for authentication
    #[serde(default = "String::new")]
    pub api_token: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Max retry attempts for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_store_endpoint(),
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    /// API key
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    /// Provider config with defaults for the given provider kind
    pub fn new(kind: TranslationProviderKind) -> Self {
        match kind {
            TranslationProviderKind::Google => Self {
                provider_type: "google".to_string(),
                api_key: String::new(),
                endpoint: default_google_endpoint(),
                timeout_secs: default_timeout_secs(),
                rate_limit: default_google_rate_limit(),
            },
            TranslationProviderKind::DeepL => Self {
                provider_type: "deepl".to_string(),
                api_key: String::new(),
                endpoint: default_deepl_endpoint(),
                timeout_secs: default_timeout_secs(),
                rate_limit: default_deepl_rate_limit(),
            },
            TranslationProviderKind::Mock => Self {
                provider_type: "mock".to_string(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
        }
    }
}

/// Settings shared by all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Max retry attempts for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Active provider
    pub provider: TranslationProviderKind,

    /// Per-provider settings
    pub available_providers: Vec<ProviderConfig>,

    /// Settings shared by all providers
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: TranslationProviderKind::default(),
            available_providers: Vec::new(),
            common: TranslationCommonConfig::default(),
        };

        // Add default providers
        config.available_providers.push(ProviderConfig::new(TranslationProviderKind::Google));
        config.available_providers.push(ProviderConfig::new(TranslationProviderKind::DeepL));
        config.available_providers.push(ProviderConfig::new(TranslationProviderKind::Mock));

        config
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProviderKind::Google => default_google_endpoint(),
            TranslationProviderKind::DeepL => default_deepl_endpoint(),
            TranslationProviderKind::Mock => String::new(),
        }
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.rate_limit;
        }

        match self.provider {
            TranslationProviderKind::Google => default_google_rate_limit(),
            TranslationProviderKind::DeepL => default_deepl_rate_limit(),
            TranslationProviderKind::Mock => None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_store_endpoint() -> String {
    "http://localhost:1337".to_string()
}

fn default_google_endpoint() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

fn default_deepl_endpoint() -> String {
    "https://api-free.deepl.com".to_string()
}

fn default_google_rate_limit() -> Option<u32> {
    // Google's default quota allows bursts well above this; stay modest so
    // one long replication run never exhausts a shared project quota
    Some(300)
}

fn default_deepl_rate_limit() -> Option<u32> {
    Some(60)
}

fn default_target_locales() -> Vec<String> {
    ["es", "fr", "de", "it", "pt", "zh", "ja", "ko", "ar"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate locales
        crate::locale_utils::validate_locale_code(&self.source_locale)?;
        for locale in &self.target_locales {
            crate::locale_utils::validate_locale_code(locale)?;
        }

        // Validate the store endpoint
        Url::parse(&self.store.endpoint)
            .map_err(|e| anyhow!("Invalid store endpoint '{}': {}", self.store.endpoint, e))?;

        // Validate API key for all providers except the mock
        match self.translation.provider {
            TranslationProviderKind::Google => {
                if self.translation.get_api_key().is_empty() {
                    return Err(anyhow!("Translation API key is required for Google provider"));
                }
            }
            TranslationProviderKind::DeepL => {
                if self.translation.get_api_key().is_empty() {
                    return Err(anyhow!("Translation API key is required for DeepL provider"));
                }
            }
            TranslationProviderKind::Mock => {}
        }

        Ok(())
    }

    /// Redacted view safe to print or serialize: the API key itself is
    /// never exposed, only whether one is set
    pub fn safe_view(&self) -> SafeConfig {
        SafeConfig {
            source_locale: self.source_locale.clone(),
            target_locales: self.target_locales.clone(),
            store_endpoint: self.store.endpoint.clone(),
            provider: self.translation.provider.clone(),
            has_api_key: !self.translation.get_api_key().is_empty(),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_locale: "en".to_string(),
            target_locales: default_target_locales(),
            store: StoreConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Configuration with secrets redacted
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SafeConfig {
    pub source_locale: String,
    pub target_locales: Vec<String>,
    pub store_endpoint: String,
    pub provider: TranslationProviderKind,
    pub has_api_key: bool,
}
