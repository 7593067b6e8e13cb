/*!
 * Content store abstraction.
 *
 * Every component takes the store as an explicit dependency through these
 * traits - there is no ambient store handle. Two implementations ship:
 * - `http`: REST client against a running content store
 * - `memory`: in-process store for tests and dry runs
 */

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::errors::StoreError;

pub mod model;
pub mod response;
pub mod http;
pub mod memory;

pub use model::{CollectionOptions, CollectionSchema, Entry, EntryId, FieldKind, LinkedLocale};
pub use response::{StoreResponse, normalize_entries};

/// Publication constraint a read query can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublicationFilter {
    /// Store-level "published only" filter
    Live,
    /// Explicit filter on the publish timestamp being set
    PublishedNotNull,
    /// No publication constraint
    #[default]
    Any,
}

/// Parameters of one read against a collection
#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    /// Publication constraint
    pub publication: PublicationFilter,

    /// Restrict to one document identity
    pub document_id: Option<String>,

    /// Restrict to one locale
    pub locale: Option<String>,

    /// Ask the store to populate the cross-locale link set
    pub populate_links: bool,

    /// Cap on returned rows
    pub limit: Option<usize>,
}

impl EntryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publication(mut self, filter: PublicationFilter) -> Self {
        self.publication = filter;
        self
    }

    pub fn document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn populate_links(mut self) -> Self {
        self.populate_links = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Payload for creating one locale variant record
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// Document identity to carry over, or `None` to let the store assign
    /// a fresh one (legacy link-list scheme)
    pub document_id: Option<String>,

    /// Locale of the new record
    pub locale: String,

    /// Create in the published state in the same call, so the variant is
    /// never visible-but-unpublished
    pub publish: bool,

    /// Content fields, already stripped of store-managed fields
    pub fields: Map<String, Value>,
}

/// One configured locale as reported by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleInfo {
    /// Locale code, e.g. "en" or "pt-BR"
    pub code: String,

    /// Human-readable name
    pub name: String,

    /// Whether this is the store's default (source) locale
    pub is_default: bool,
}

/// Read/write access to the content store
#[async_trait]
pub trait ContentStore: Send + Sync + Debug {
    /// Names of all content collections, in store order
    async fn collections(&self) -> Result<Vec<String>, StoreError>;

    /// Ordered attributes of one collection
    async fn attributes_of(&self, collection: &str) -> Result<Vec<(String, FieldKind)>, StoreError>;

    /// Behavior flags of one collection
    async fn options_of(&self, collection: &str) -> Result<CollectionOptions, StoreError>;

    /// Run a read query. The raw response shape is store-defined; callers
    /// normalize through [`StoreResponse`].
    async fn find_entries(&self, collection: &str, query: &EntryQuery) -> Result<StoreResponse, StoreError>;

    /// Load one entry by id, `None` when it does not exist
    async fn find_entry(&self, collection: &str, id: EntryId, populate_links: bool) -> Result<Option<Entry>, StoreError>;

    /// Low-level query bypassing the higher-level read API. Last-resort
    /// escape hatch for stores whose filtered reads misbehave.
    async fn query_raw(&self, collection: &str) -> Result<Vec<Entry>, StoreError>;

    /// Create a record, returning it as the store sees it
    async fn create_entry(&self, collection: &str, new_entry: NewEntry) -> Result<Entry, StoreError>;

    /// Replace one entry's cross-locale link set
    async fn update_links(&self, collection: &str, id: EntryId, links: &[EntryId]) -> Result<(), StoreError>;

    /// Move one entry to the published state
    async fn publish_entry(&self, collection: &str, id: EntryId) -> Result<(), StoreError>;

    /// Assemble a full schema from the introspection calls
    async fn schema(&self, collection: &str) -> Result<CollectionSchema, StoreError> {
        let attributes = self.attributes_of(collection).await?;
        let options = self.options_of(collection).await?;
        Ok(CollectionSchema::new(collection, attributes, options))
    }
}

/// The store's configured locale set
#[async_trait]
pub trait LocaleRegistry: Send + Sync + Debug {
    /// All configured locales
    async fn locales(&self) -> Result<Vec<LocaleInfo>, StoreError>;
}
