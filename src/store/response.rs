/*!
 * Normalization of the store's polymorphic read responses.
 *
 * The same read API has been observed returning a bare list, a paginated
 * wrapper, a `data` wrapper (around a list or a single object), or a single
 * object. Classification happens once, here, so everything above the store
 * boundary only ever sees a flat sequence of entries.
 */

use serde_json::Value;

use crate::store::model::Entry;

/// The response shapes the store is known to produce
#[derive(Debug, Clone, PartialEq)]
pub enum StoreResponse {
    /// Bare array of records
    List(Vec<Value>),
    /// Paginated wrapper: `{"results": [...], ...}`
    Paginated(Vec<Value>),
    /// Data wrapper: `{"data": [...]}` or `{"data": {...}}`
    Wrapped(Vec<Value>),
    /// A single record object
    Single(Value),
    /// Nothing usable
    Empty,
}

impl StoreResponse {
    /// Classify a raw response into one of the known shapes.
    ///
    /// Order matters and mirrors how the shapes are told apart in the wild:
    /// a `results` array wins over a `data` wrapper, and an object with an
    /// `id` is a record even if it also happens to carry a `data` field.
    pub fn classify(raw: Value) -> StoreResponse {
        match raw {
            Value::Array(items) => StoreResponse::List(items),
            Value::Object(mut obj) => {
                if let Some(Value::Array(results)) = obj.get("results") {
                    return StoreResponse::Paginated(results.clone());
                }
                if obj.contains_key("id") {
                    return StoreResponse::Single(Value::Object(obj));
                }
                match obj.remove("data") {
                    Some(Value::Array(items)) => StoreResponse::Wrapped(items),
                    Some(data @ Value::Object(_)) if data.get("id").is_some() => {
                        StoreResponse::Wrapped(vec![data])
                    }
                    _ => StoreResponse::Empty,
                }
            }
            _ => StoreResponse::Empty,
        }
    }

    /// Flatten into entries, dropping rows that are null or carry no id
    pub fn normalize(self) -> Vec<Entry> {
        let values = match self {
            StoreResponse::List(items)
            | StoreResponse::Paginated(items)
            | StoreResponse::Wrapped(items) => items,
            StoreResponse::Single(value) => vec![value],
            StoreResponse::Empty => Vec::new(),
        };

        values.iter().filter_map(Entry::from_value).collect()
    }

    /// Whether normalization would yield no entries
    pub fn is_empty(&self) -> bool {
        match self {
            StoreResponse::List(items)
            | StoreResponse::Paginated(items)
            | StoreResponse::Wrapped(items) => items.is_empty(),
            StoreResponse::Single(_) => false,
            StoreResponse::Empty => true,
        }
    }
}

/// Classify and normalize in one step
pub fn normalize_entries(raw: Value) -> Vec<Entry> {
    StoreResponse::classify(raw).normalize()
}
