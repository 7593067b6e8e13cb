/*!
 * Data model for content store entries and collection schemas.
 *
 * Entries keep their content as a raw JSON map on purpose: stores in the
 * field disagree about where publication state lives (`publishedAt`,
 * `published`, `status`, `publicationState`), and a `publishedAt` that is
 * explicitly null must stay distinguishable from one that is absent.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Store-assigned identifier of one physical record
pub type EntryId = i64;

/// Declared kind of a collection attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Short text
    String,
    /// Long text
    Text,
    /// Rich/structured text
    RichText,
    Integer,
    Float,
    Boolean,
    Date,
    Datetime,
    Json,
    Enumeration,
    Media,
    Relation,
    Uid,
}

impl FieldKind {
    /// Whether values of this kind are human-readable text worth translating
    pub fn is_translatable(self) -> bool {
        matches!(self, FieldKind::String | FieldKind::Text | FieldKind::RichText)
    }
}

/// Per-collection behavior flags reported by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOptions {
    /// Whether entries go through a draft/publish lifecycle.
    /// When false, every entry that exists is eligible.
    #[serde(default)]
    pub draft_and_publish: bool,

    /// Whether the collection participates in localization at all
    #[serde(default)]
    pub localized: bool,

    /// Whether the store keeps locale variants linked through a shared
    /// document identity. When false the collection uses the legacy
    /// link-list scheme and variants get freshly assigned identities.
    #[serde(default = "default_stable_identity")]
    pub stable_identity: bool,
}

fn default_stable_identity() -> bool {
    true
}

impl Default for CollectionOptions {
    fn default() -> Self {
        Self {
            draft_and_publish: false,
            localized: false,
            stable_identity: true,
        }
    }
}

/// Schema of one content collection: name, ordered attributes, flags
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSchema {
    /// Collection name as known to the store
    pub name: String,

    /// Ordered (field name, field kind) pairs
    pub attributes: Vec<(String, FieldKind)>,

    /// Behavior flags
    pub options: CollectionOptions,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>, attributes: Vec<(String, FieldKind)>, options: CollectionOptions) -> Self {
        Self {
            name: name.into(),
            attributes,
            options,
        }
    }

    /// Look up the declared kind of one attribute
    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.attributes.iter()
            .find(|(name, _)| name == field)
            .map(|(_, kind)| *kind)
    }
}

/// A cross-locale link to another physical record in the same collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedLocale {
    /// Store-assigned id of the linked record
    pub id: EntryId,

    /// Locale of the linked record, when the store populated it
    pub locale: Option<String>,
}

/// One physical record in a collection.
///
/// `id`, `documentId`, `locale` and the link set are lifted out of the raw
/// map; everything else (content fields and publication indicator fields)
/// stays in `fields` as the store returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Store-assigned id, unique per physical row
    pub id: EntryId,

    /// Stable identity shared by all locale variants of one logical
    /// document. Absent on malformed data.
    pub document_id: Option<String>,

    /// Locale code of this record, when set
    pub locale: Option<String>,

    /// Legacy cross-locale link set, collection-local
    pub linked_locales: Vec<LinkedLocale>,

    /// Remaining fields, verbatim from the store
    pub fields: Map<String, Value>,
}

impl Entry {
    /// Build an entry from a raw store object. Returns `None` for values
    /// that are not objects or that carry no usable id - such rows are
    /// dropped during response normalization.
    pub fn from_value(value: &Value) -> Option<Entry> {
        let obj = value.as_object()?;
        let id = obj.get("id").and_then(Value::as_i64)?;

        let document_id = obj.get("documentId")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let locale = obj.get("locale")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let linked_locales = obj.get("localizations")
            .map(parse_links)
            .unwrap_or_default();

        let mut fields = Map::new();
        for (key, val) in obj {
            if !matches!(key.as_str(), "id" | "documentId" | "locale" | "localizations") {
                fields.insert(key.clone(), val.clone());
            }
        }

        Some(Entry {
            id,
            document_id,
            locale,
            linked_locales,
            fields,
        })
    }

    /// Rebuild the raw store object for this entry
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("id".to_string(), Value::from(self.id));
        if let Some(document_id) = &self.document_id {
            obj.insert("documentId".to_string(), Value::from(document_id.clone()));
        }
        if let Some(locale) = &self.locale {
            obj.insert("locale".to_string(), Value::from(locale.clone()));
        }
        if !self.linked_locales.is_empty() {
            let links: Vec<Value> = self.linked_locales.iter()
                .map(|link| {
                    let mut l = Map::new();
                    l.insert("id".to_string(), Value::from(link.id));
                    if let Some(locale) = &link.locale {
                        l.insert("locale".to_string(), Value::from(locale.clone()));
                    }
                    Value::Object(l)
                })
                .collect();
            obj.insert("localizations".to_string(), Value::Array(links));
        }
        for (key, val) in &self.fields {
            obj.insert(key.clone(), val.clone());
        }
        Value::Object(obj)
    }

    /// Derived publication state.
    ///
    /// Stores expose publication inconsistently, so an entry counts as
    /// published if ANY of the known indicators says so. Discovery and
    /// replication both go through this one predicate so the two passes
    /// can never disagree about the same entry.
    pub fn is_published(&self) -> bool {
        let published_at = self.fields.get("publishedAt");
        if published_at.is_some_and(truthy) {
            return true;
        }
        if self.fields.get("published").and_then(Value::as_bool) == Some(true) {
            return true;
        }
        if self.fields.get("status").and_then(Value::as_str) == Some("published") {
            return true;
        }
        if self.fields.get("publicationState").and_then(Value::as_str) == Some("live") {
            return true;
        }
        // Last resort for stores with ambiguous schemas: a timestamp that is
        // explicitly null, with no explicit unpublished flag to contradict it
        matches!(published_at, Some(Value::Null))
            && self.fields.get("published").and_then(Value::as_bool) != Some(false)
    }

    /// Whether the raw publish timestamp itself is set. Weaker than
    /// `is_published`; used to decide whether a source entry needs its
    /// publication healed after a variant was written.
    pub fn has_publish_timestamp(&self) -> bool {
        self.fields.get("publishedAt").is_some_and(truthy)
    }

    /// Ids in the link set, in stored order
    pub fn linked_ids(&self) -> Vec<EntryId> {
        self.linked_locales.iter().map(|link| link.id).collect()
    }
}

/// Loose truthiness over raw store values: null, false, 0 and "" do not
/// count as set. Matches how the publication indicators behave in the wild.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_links(value: &Value) -> Vec<LinkedLocale> {
    match value {
        Value::Array(items) => items.iter()
            .filter_map(|item| match item {
                // Bare id
                Value::Number(n) => n.as_i64().map(|id| LinkedLocale { id, locale: None }),
                // Populated link object
                Value::Object(obj) => obj.get("id").and_then(Value::as_i64).map(|id| LinkedLocale {
                    id,
                    locale: obj.get("locale").and_then(Value::as_str).map(str::to_string),
                }),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
