use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::errors::ProviderError;
use crate::providers::{Language, TranslationProvider};

/// DeepL API v2 client
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to the free-tier endpoint)
    endpoint: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl std::fmt::Debug for DeepL {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepL")
            .field("endpoint", &self.endpoint)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct LanguageItem {
    language: String,
    name: String,
}

impl DeepL {
    /// Create a new DeepL client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, 3, 1000)
    }

    /// Create a new DeepL client with retry configuration
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            max_retries,
            backoff_base_ms,
        }
    }

    fn api_url(&self, path: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api-free.deepl.com"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/v2{}", base, path)
    }

    async fn request_with_retry(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, ProviderError> {
        let mut last_error = ProviderError::RequestFailed("no attempts made".to_string());

        for attempt in 1..=self.max_retries.max(1) {
            let request = build()
                .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key));

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json().await
                            .map_err(|e| ProviderError::ParseError(e.to_string()));
                    }

                    let message = response.text().await
                        .unwrap_or_else(|_| "failed to read error body".to_string());
                    match status.as_u16() {
                        401 | 403 => return Err(ProviderError::AuthenticationError(message)),
                        429 | 456 => {
                            warn!("DeepL rate/quota limited (attempt {}/{})", attempt, self.max_retries);
                            last_error = ProviderError::RateLimitExceeded(message);
                        }
                        code if status.is_client_error() => {
                            return Err(ProviderError::ApiError { status_code: code, message });
                        }
                        code => {
                            warn!("DeepL API error {} (attempt {}/{})", code, attempt, self.max_retries);
                            last_error = ProviderError::ApiError { status_code: code, message };
                        }
                    }
                }
                Err(e) => {
                    warn!("DeepL request failed (attempt {}/{}): {}", attempt, self.max_retries, e);
                    last_error = ProviderError::ConnectionError(e.to_string());
                }
            }

            if attempt < self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl TranslationProvider for DeepL {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        let url = self.api_url("/translate");
        let body = json!({
            "text": [text],
            "source_lang": source.to_uppercase(),
            "target_lang": target.to_uppercase(),
        });

        let raw = self.request_with_retry(|| self.client.post(&url).json(&body)).await?;
        let response: TranslateResponse = serde_json::from_value(raw)
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        response.translations.into_iter().next()
            .map(|t| t.text)
            .ok_or_else(|| ProviderError::ParseError("empty translations array".to_string()))
    }

    async fn supported_languages(&self) -> Result<Vec<Language>, ProviderError> {
        let url = self.api_url("/languages");
        let raw = self.request_with_retry(|| self.client.get(&url).query(&[("type", "target")])).await?;
        let items: Vec<LanguageItem> = serde_json::from_value(raw)
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(items.into_iter()
            .map(|item| Language {
                code: item.language.to_lowercase(),
                name: item.name,
            })
            .collect())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.supported_languages().await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "deepl"
    }
}
