use std::time::Duration;

use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::errors::ProviderError;
use crate::providers::{Language, TranslationProvider};

/// Google Cloud Translation v2 client
pub struct Google {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to the public API)
    endpoint: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    rate_limit: Option<u32>,
}

impl std::fmt::Debug for Google {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Google")
            .field("endpoint", &self.endpoint)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Translation response payload
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslationsData,
}

#[derive(Debug, Deserialize)]
struct TranslationsData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Language listing response payload
#[derive(Debug, Deserialize)]
struct LanguagesResponse {
    data: LanguagesData,
}

#[derive(Debug, Deserialize)]
struct LanguagesData {
    languages: Vec<LanguageItem>,
}

#[derive(Debug, Deserialize)]
struct LanguageItem {
    language: String,
    #[serde(default)]
    name: Option<String>,
}

impl Google {
    /// Create a new Google client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, 3, 1000, None)
    }

    /// Create a new Google client with retry and rate limit configuration
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        max_retries: u32,
        backoff_base_ms: u64,
        rate_limit: Option<u32>,
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
            rate_limit,
        }
    }

    fn api_url(&self, path: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://translation.googleapis.com/language/translate/v2"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}{}", base, path)
    }

    /// POST a request with retry on server/network errors, honoring the
    /// configured rate limit
    async fn post_with_retry(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value, ProviderError> {
        let mut last_error = ProviderError::RequestFailed("no attempts made".to_string());

        for attempt in 1..=self.max_retries.max(1) {
            if let Some(rate_limit) = self.rate_limit {
                let delay_ms = 60_000 / rate_limit as u64;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let result = self.client.post(url)
                .query(&[("key", self.api_key.as_str())])
                .json(body)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json().await
                            .map_err(|e| ProviderError::ParseError(e.to_string()));
                    }

                    let message = response.text().await
                        .unwrap_or_else(|_| "failed to read error body".to_string());
                    match status.as_u16() {
                        401 | 403 => {
                            return Err(ProviderError::AuthenticationError(message));
                        }
                        429 => {
                            warn!("Google API rate limited (attempt {}/{})", attempt, self.max_retries);
                            last_error = ProviderError::RateLimitExceeded(message);
                        }
                        code if status.is_client_error() => {
                            return Err(ProviderError::ApiError { status_code: code, message });
                        }
                        code => {
                            warn!("Google API error {} (attempt {}/{})", code, attempt, self.max_retries);
                            last_error = ProviderError::ApiError { status_code: code, message };
                        }
                    }
                }
                Err(e) => {
                    warn!("Google API request failed (attempt {}/{}): {}", attempt, self.max_retries, e);
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
impl TranslationProvider for Google {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        let body = json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
        });

        let raw = self.post_with_retry(&self.api_url(""), &body).await?;
        let response: TranslateResponse = serde_json::from_value(raw)
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        response.data.translations.into_iter().next()
            .map(|t| t.translated_text)
            .ok_or_else(|| {
                error!("Google API returned no translations for a non-empty request");
                ProviderError::ParseError("empty translations array".to_string())
            })
    }

    async fn supported_languages(&self) -> Result<Vec<Language>, ProviderError> {
        let body = json!({ "target": "en" });
        let raw = self.post_with_retry(&self.api_url("/languages"), &body).await?;
        let response: LanguagesResponse = serde_json::from_value(raw)
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(response.data.languages.into_iter()
            .map(|item| Language {
                name: item.name.unwrap_or_else(|| item.language.to_uppercase()),
                code: item.language,
            })
            .collect())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.supported_languages().await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
