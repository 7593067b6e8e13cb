/*!
 * REST client for a running content store.
 *
 * Reads come back in whatever shape the store feels like producing; this
 * client hands the raw JSON to [`StoreResponse`] and leaves interpretation
 * to the caller. Writes are locale-aware and publish in the same call.
 */

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Map, Value, json};

use crate::errors::StoreError;
use crate::store::model::{CollectionOptions, CollectionSchema, Entry, EntryId, FieldKind};
use crate::store::response::StoreResponse;
use crate::store::{ContentStore, EntryQuery, LocaleInfo, LocaleRegistry, NewEntry, PublicationFilter};

/// HTTP content store client
pub struct HttpStore {
    /// Base URL of the store API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Bearer token for authentication
    api_token: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Schema cache filled on first introspection
    schemas: RwLock<HashMap<String, CollectionSchema>>,
    /// Collection names in store order, filled with the schema cache
    collection_order: RwLock<Vec<String>>,
}

impl std::fmt::Debug for HttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStore")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl HttpStore {
    /// Create a new store client
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self::new_with_config(base_url, api_token, 3, 1000, 30)
    }

    /// Create a new store client with retry and timeout configuration
    pub fn new_with_config(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        max_retries: u32,
        backoff_base_ms: u64,
        timeout_secs: u64,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_token: api_token.into(),
            max_retries,
            backoff_base_ms,
            schemas: RwLock::new(HashMap::new()),
            collection_order: RwLock::new(Vec::new()),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if self.api_token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.api_token)
        }
    }

    /// Send a request with retry on server/network errors. Client errors
    /// (4xx) are surfaced immediately - retrying them cannot help.
    async fn send_retrying(&self, build: impl Fn() -> RequestBuilder) -> Result<Value, StoreError> {
        let mut last_error = StoreError::RequestFailed("no attempts made".to_string());

        for attempt in 1..=self.max_retries.max(1) {
            let request = self.authorize(build());
            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<Value>().await
                            .map_err(|e| StoreError::ParseError(e.to_string()));
                    }

                    let message = response.text().await
                        .unwrap_or_else(|_| "failed to read error body".to_string());
                    if status.is_client_error() {
                        return Err(StoreError::ApiError {
                            status_code: status.as_u16(),
                            message,
                        });
                    }
                    warn!("Store returned {} (attempt {}/{}): {}",
                          status, attempt, self.max_retries, message);
                    last_error = StoreError::ApiError {
                        status_code: status.as_u16(),
                        message,
                    };
                }
                Err(e) => {
                    warn!("Store request failed (attempt {}/{}): {}", attempt, self.max_retries, e);
                    last_error = StoreError::RequestFailed(e.to_string());
                }
            }

            if attempt < self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error)
    }

    /// Fetch and cache the store's content-type registry
    async fn ensure_schemas(&self) -> Result<(), StoreError> {
        if !self.collection_order.read().is_empty() {
            return Ok(());
        }

        let url = format!("{}/api/content-types", self.base_url);
        let raw = self.send_retrying(|| self.client.get(&url)).await?;

        let types = raw.as_array()
            .ok_or_else(|| StoreError::ParseError("content-type registry is not an array".to_string()))?;

        let mut order = Vec::new();
        let mut schemas = HashMap::new();
        for content_type in types {
            let Some(name) = content_type.get("name").and_then(Value::as_str) else {
                continue;
            };
            let attributes = parse_attributes(content_type.get("attributes"));
            let options: CollectionOptions = content_type.get("options")
                .cloned()
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| StoreError::ParseError(format!("options of '{}': {}", name, e)))?
                .unwrap_or_default();

            order.push(name.to_string());
            schemas.insert(name.to_string(), CollectionSchema::new(name, attributes, options));
        }

        debug!("Cached {} collection schemas from store", order.len());
        *self.collection_order.write() = order;
        *self.schemas.write() = schemas;
        Ok(())
    }

    fn cached_schema(&self, collection: &str) -> Result<CollectionSchema, StoreError> {
        self.schemas.read()
            .get(collection)
            .cloned()
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))
    }

    fn query_params(query: &EntryQuery) -> Vec<(String, String)> {
        let mut params = Vec::new();
        match query.publication {
            PublicationFilter::Live => {
                params.push(("publicationState".to_string(), "live".to_string()));
            }
            PublicationFilter::PublishedNotNull => {
                params.push(("filters[publishedAt][$notNull]".to_string(), "true".to_string()));
            }
            PublicationFilter::Any => {}
        }
        if let Some(document_id) = &query.document_id {
            params.push(("filters[documentId]".to_string(), document_id.clone()));
        }
        if let Some(locale) = &query.locale {
            params.push(("filters[locale]".to_string(), locale.clone()));
        }
        if query.populate_links {
            params.push(("populate".to_string(), "localizations".to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

fn parse_attributes(raw: Option<&Value>) -> Vec<(String, FieldKind)> {
    let Some(Value::Object(attributes)) = raw else {
        return Vec::new();
    };

    attributes.iter()
        .map(|(name, decl)| {
            let kind_str = decl.as_str()
                .or_else(|| decl.get("type").and_then(Value::as_str))
                .unwrap_or("json");
            (name.clone(), parse_kind(kind_str))
        })
        .collect()
}

fn parse_kind(kind: &str) -> FieldKind {
    match kind {
        "string" => FieldKind::String,
        "text" => FieldKind::Text,
        "richtext" => FieldKind::RichText,
        "integer" | "biginteger" => FieldKind::Integer,
        "float" | "decimal" => FieldKind::Float,
        "boolean" => FieldKind::Boolean,
        "date" => FieldKind::Date,
        "datetime" | "time" | "timestamp" => FieldKind::Datetime,
        "enumeration" => FieldKind::Enumeration,
        "media" => FieldKind::Media,
        "relation" => FieldKind::Relation,
        "uid" => FieldKind::Uid,
        other => {
            debug!("Unknown attribute kind '{}', treating as json", other);
            FieldKind::Json
        }
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn collections(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_schemas().await?;
        Ok(self.collection_order.read().clone())
    }

    async fn attributes_of(&self, collection: &str) -> Result<Vec<(String, FieldKind)>, StoreError> {
        self.ensure_schemas().await?;
        Ok(self.cached_schema(collection)?.attributes)
    }

    async fn options_of(&self, collection: &str) -> Result<CollectionOptions, StoreError> {
        self.ensure_schemas().await?;
        Ok(self.cached_schema(collection)?.options)
    }

    async fn find_entries(&self, collection: &str, query: &EntryQuery) -> Result<StoreResponse, StoreError> {
        let url = format!("{}/api/content/{}", self.base_url, collection);
        let params = Self::query_params(query);
        let raw = self.send_retrying(|| self.client.get(&url).query(&params)).await?;
        Ok(StoreResponse::classify(raw))
    }

    async fn find_entry(&self, collection: &str, id: EntryId, populate_links: bool) -> Result<Option<Entry>, StoreError> {
        let url = format!("{}/api/content/{}/{}", self.base_url, collection, id);
        let params = if populate_links {
            vec![("populate".to_string(), "localizations".to_string())]
        } else {
            Vec::new()
        };

        match self.send_retrying(|| self.client.get(&url).query(&params)).await {
            Ok(raw) => Ok(StoreResponse::classify(raw).normalize().into_iter().next()),
            Err(StoreError::ApiError { status_code, .. }) if status_code == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn query_raw(&self, collection: &str) -> Result<Vec<Entry>, StoreError> {
        let url = format!("{}/api/content/{}/raw", self.base_url, collection);
        let raw = self.send_retrying(|| self.client.get(&url)).await?;
        Ok(StoreResponse::classify(raw).normalize())
    }

    async fn create_entry(&self, collection: &str, new_entry: NewEntry) -> Result<Entry, StoreError> {
        let url = format!("{}/api/content/{}", self.base_url, collection);

        let mut data = Map::new();
        if let Some(document_id) = &new_entry.document_id {
            data.insert("documentId".to_string(), Value::from(document_id.clone()));
        }
        for (key, value) in &new_entry.fields {
            data.insert(key.clone(), value.clone());
        }

        let body = json!({
            "data": Value::Object(data),
            "locale": new_entry.locale,
            "status": if new_entry.publish { "published" } else { "draft" },
        });

        let raw = self.send_retrying(|| self.client.post(&url).json(&body)).await?;
        StoreResponse::classify(raw).normalize().into_iter().next()
            .ok_or_else(|| {
                error!("Store create on '{}' returned no record", collection);
                StoreError::WriteFailed("creation returned no record id".to_string())
            })
    }

    async fn update_links(&self, collection: &str, id: EntryId, links: &[EntryId]) -> Result<(), StoreError> {
        let url = format!("{}/api/content/{}/{}/links", self.base_url, collection, id);
        let body = json!({ "localizations": links });
        self.send_retrying(|| self.client.put(&url).json(&body)).await?;
        Ok(())
    }

    async fn publish_entry(&self, collection: &str, id: EntryId) -> Result<(), StoreError> {
        let url = format!("{}/api/content/{}/{}/publish", self.base_url, collection, id);
        self.send_retrying(|| self.client.post(&url)).await?;
        Ok(())
    }
}

#[async_trait]
impl LocaleRegistry for HttpStore {
    async fn locales(&self) -> Result<Vec<LocaleInfo>, StoreError> {
        let url = format!("{}/api/locales", self.base_url);
        let raw = self.send_retrying(|| self.client.get(&url)).await?;

        let items = match &raw {
            Value::Array(items) => items.clone(),
            Value::Object(obj) => match obj.get("data") {
                Some(Value::Array(items)) => items.clone(),
                _ => return Err(StoreError::ParseError("locale list has unknown shape".to_string())),
            },
            _ => return Err(StoreError::ParseError("locale list has unknown shape".to_string())),
        };

        Ok(items.iter()
            .filter_map(|item| {
                let code = item.get("code").and_then(Value::as_str)?;
                Some(LocaleInfo {
                    code: code.to_string(),
                    name: item.get("name").and_then(Value::as_str)
                        .map_or_else(|| code.to_uppercase(), str::to_string),
                    is_default: item.get("isDefault").and_then(Value::as_bool).unwrap_or(false),
                })
            })
            .collect())
    }
}
