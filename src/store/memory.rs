/*!
 * In-process content store.
 *
 * Backs the test suite and dry runs. Besides behaving like a well-formed
 * store, it can reproduce the misbehaviors seen in the field: filtered
 * reads that come back empty, each of the known response shapes, and
 * creates that ignore the requested document identity.
 */

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::store::model::{CollectionOptions, CollectionSchema, Entry, EntryId, FieldKind, LinkedLocale};
use crate::store::response::StoreResponse;
use crate::store::{ContentStore, EntryQuery, LocaleInfo, LocaleRegistry, NewEntry, PublicationFilter};

/// Which response shape a collection's reads are wrapped in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
    /// Bare array
    #[default]
    Bare,
    /// `{"results": [...]}` wrapper
    Paginated,
    /// `{"data": [...]}` wrapper
    Wrapped,
    /// Single object when exactly one row matches, bare array otherwise
    SingleWhenAlone,
}

/// Store misbehaviors a collection can be configured to reproduce
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreQuirks {
    /// The store-level "published only" filter silently returns nothing
    pub live_filter_returns_nothing: bool,

    /// The explicit publish-timestamp filter silently returns nothing
    pub published_filter_returns_nothing: bool,

    /// The higher-level read API sees no rows at all; only the low-level
    /// query path reaches them
    pub hidden_from_api: bool,

    /// Every read against this collection fails outright
    pub reads_fail: bool,

    /// Creates discard the requested document identity and assign a fresh
    /// one - reproduces the integrity fault the writer must detect
    pub ignores_requested_identity: bool,
}

#[derive(Debug)]
struct CollectionState {
    schema: CollectionSchema,
    shape: ResponseShape,
    quirks: StoreQuirks,
    entries: Vec<Entry>,
}

#[derive(Debug, Default)]
struct Inner {
    order: Vec<String>,
    collections: HashMap<String, CollectionState>,
    locales: Vec<LocaleInfo>,
    next_id: EntryId,
}

/// In-memory [`ContentStore`] + [`LocaleRegistry`] implementation
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MemoryStore")
            .field("collections", &inner.order)
            .field("locales", &inner.locales.len())
            .finish()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    /// Register the configured locale set
    pub fn set_locales(&self, locales: Vec<LocaleInfo>) {
        self.inner.write().locales = locales;
    }

    /// Register a collection with its schema
    pub fn add_collection(&self, schema: CollectionSchema) {
        self.add_collection_with(schema, ResponseShape::default(), StoreQuirks::default());
    }

    /// Register a collection with a response shape and quirks
    pub fn add_collection_with(&self, schema: CollectionSchema, shape: ResponseShape, quirks: StoreQuirks) {
        let mut inner = self.inner.write();
        let name = schema.name.clone();
        inner.order.push(name.clone());
        inner.collections.insert(name, CollectionState {
            schema,
            shape,
            quirks,
            entries: Vec::new(),
        });
    }

    /// Seed one entry from a raw store object. The object must carry an
    /// `id`; ids are caller-managed for seeded rows.
    pub fn seed_entry(&self, collection: &str, raw: Value) -> Result<EntryId, StoreError> {
        let entry = Entry::from_value(&raw)
            .ok_or_else(|| StoreError::ParseError("seed entry must be an object with an id".to_string()))?;
        let id = entry.id;

        let mut inner = self.inner.write();
        if id >= inner.next_id {
            inner.next_id = id + 1;
        }
        let state = inner.collections.get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        state.entries.push(entry);
        Ok(id)
    }

    /// Snapshot of one entry, bypassing the query path (test assertions)
    pub fn entry_snapshot(&self, collection: &str, id: EntryId) -> Option<Entry> {
        let inner = self.inner.read();
        inner.collections.get(collection)?
            .entries.iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    /// Number of physical rows in one collection
    pub fn entry_count(&self, collection: &str) -> usize {
        let inner = self.inner.read();
        inner.collections.get(collection).map_or(0, |state| state.entries.len())
    }

    /// Delete one row outright (used to manufacture dangling links)
    pub fn delete_entry(&self, collection: &str, id: EntryId) {
        let mut inner = self.inner.write();
        if let Some(state) = inner.collections.get_mut(collection) {
            state.entries.retain(|entry| entry.id != id);
        }
    }

    /// Fill in the locale of each link from the record it points at, the
    /// way a real store's populate does. Links to deleted records keep a
    /// bare id.
    fn resolve_links(state: &CollectionState, mut entry: Entry) -> Entry {
        for link in &mut entry.linked_locales {
            if link.locale.is_none() {
                link.locale = state.entries.iter()
                    .find(|candidate| candidate.id == link.id)
                    .and_then(|candidate| candidate.locale.clone());
            }
        }
        entry
    }

    fn matching_rows(state: &CollectionState, query: &EntryQuery) -> Vec<Entry> {
        let mut rows: Vec<Entry> = state.entries.iter()
            .filter(|entry| match query.publication {
                PublicationFilter::Live => entry.is_published(),
                PublicationFilter::PublishedNotNull => entry.has_publish_timestamp(),
                PublicationFilter::Any => true,
            })
            .filter(|entry| query.document_id.as_ref()
                .is_none_or(|wanted| entry.document_id.as_ref() == Some(wanted)))
            .filter(|entry| query.locale.as_ref()
                .is_none_or(|wanted| entry.locale.as_ref() == Some(wanted)))
            .cloned()
            .map(|entry| Self::resolve_links(state, entry))
            .collect();

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        rows
    }

    fn wrap(shape: ResponseShape, rows: Vec<Entry>) -> StoreResponse {
        let values: Vec<Value> = rows.iter().map(Entry::to_value).collect();
        match shape {
            ResponseShape::Bare => StoreResponse::List(values),
            ResponseShape::Paginated => StoreResponse::Paginated(values),
            ResponseShape::Wrapped => StoreResponse::Wrapped(values),
            ResponseShape::SingleWhenAlone => {
                if values.len() == 1 {
                    StoreResponse::Single(values.into_iter().next().expect("one row"))
                } else {
                    StoreResponse::List(values)
                }
            }
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn collections(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.inner.read().order.clone())
    }

    async fn attributes_of(&self, collection: &str) -> Result<Vec<(String, FieldKind)>, StoreError> {
        let inner = self.inner.read();
        let state = inner.collections.get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        Ok(state.schema.attributes.clone())
    }

    async fn options_of(&self, collection: &str) -> Result<CollectionOptions, StoreError> {
        let inner = self.inner.read();
        let state = inner.collections.get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        Ok(state.schema.options)
    }

    async fn find_entries(&self, collection: &str, query: &EntryQuery) -> Result<StoreResponse, StoreError> {
        let inner = self.inner.read();
        let state = inner.collections.get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        if state.quirks.reads_fail {
            return Err(StoreError::RequestFailed(format!("simulated read failure on '{}'", collection)));
        }
        if state.quirks.hidden_from_api {
            return Ok(StoreResponse::Empty);
        }
        match query.publication {
            PublicationFilter::Live if state.quirks.live_filter_returns_nothing => {
                return Ok(Self::wrap(state.shape, Vec::new()));
            }
            PublicationFilter::PublishedNotNull if state.quirks.published_filter_returns_nothing => {
                return Ok(Self::wrap(state.shape, Vec::new()));
            }
            _ => {}
        }

        Ok(Self::wrap(state.shape, Self::matching_rows(state, query)))
    }

    async fn find_entry(&self, collection: &str, id: EntryId, _populate_links: bool) -> Result<Option<Entry>, StoreError> {
        let inner = self.inner.read();
        let state = inner.collections.get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        Ok(state.entries.iter()
            .find(|entry| entry.id == id)
            .cloned()
            .map(|entry| Self::resolve_links(state, entry)))
    }

    async fn query_raw(&self, collection: &str) -> Result<Vec<Entry>, StoreError> {
        let inner = self.inner.read();
        let state = inner.collections.get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        if state.quirks.reads_fail {
            return Err(StoreError::RequestFailed(format!("simulated read failure on '{}'", collection)));
        }
        Ok(state.entries.clone())
    }

    async fn create_entry(&self, collection: &str, new_entry: NewEntry) -> Result<Entry, StoreError> {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;

        let state = inner.collections.get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let document_id = if state.quirks.ignores_requested_identity {
            Uuid::new_v4().to_string()
        } else {
            new_entry.document_id.unwrap_or_else(|| Uuid::new_v4().to_string())
        };

        let mut fields = new_entry.fields;
        let now = Utc::now().to_rfc3339();
        fields.insert("createdAt".to_string(), Value::from(now.clone()));
        fields.insert("updatedAt".to_string(), Value::from(now.clone()));
        if new_entry.publish {
            fields.insert("publishedAt".to_string(), Value::from(now));
        }

        let entry = Entry {
            id,
            document_id: Some(document_id),
            locale: Some(new_entry.locale),
            linked_locales: Vec::new(),
            fields,
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn update_links(&self, collection: &str, id: EntryId, links: &[EntryId]) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let state = inner.collections.get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        let entry = state.entries.iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::WriteFailed(format!("entry {} not found", id)))?;
        entry.linked_locales = links.iter()
            .map(|&link_id| LinkedLocale { id: link_id, locale: None })
            .collect();
        Ok(())
    }

    async fn publish_entry(&self, collection: &str, id: EntryId) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let state = inner.collections.get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;
        let entry = state.entries.iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| StoreError::WriteFailed(format!("entry {} not found", id)))?;
        entry.fields.insert("publishedAt".to_string(), Value::from(Utc::now().to_rfc3339()));
        Ok(())
    }
}

#[async_trait]
impl LocaleRegistry for MemoryStore {
    async fn locales(&self) -> Result<Vec<LocaleInfo>, StoreError> {
        Ok(self.inner.read().locales.clone())
    }
}
