/*!
 * Common test utilities for the locweave test suite
 */

use std::sync::Arc;

use serde_json::{Value, json};

use locweave::providers::mock::MockProvider;
use locweave::replication::ReplicationEngine;
use locweave::store::memory::MemoryStore;
use locweave::store::model::{CollectionOptions, CollectionSchema, FieldKind};
use locweave::store::{ContentStore, LocaleInfo, LocaleRegistry};
use locweave::translation::TranslationService;

/// Schema for a typical localized article collection with draft/publish
/// and stable cross-locale identities
pub fn article_schema() -> CollectionSchema {
    CollectionSchema::new(
        "article",
        vec![
            ("title".to_string(), FieldKind::String),
            ("summary".to_string(), FieldKind::Text),
            ("body".to_string(), FieldKind::RichText),
            ("views".to_string(), FieldKind::Integer),
            ("slug".to_string(), FieldKind::Uid),
        ],
        CollectionOptions {
            draft_and_publish: true,
            localized: true,
            stable_identity: true,
        },
    )
}

/// Schema for a legacy collection using the link-list identity scheme
pub fn landing_schema() -> CollectionSchema {
    CollectionSchema::new(
        "landing",
        vec![
            ("headline".to_string(), FieldKind::String),
            ("intro".to_string(), FieldKind::Text),
        ],
        CollectionOptions {
            draft_and_publish: true,
            localized: true,
            stable_identity: false,
        },
    )
}

/// Schema for a collection without localization support
pub fn gadget_schema() -> CollectionSchema {
    CollectionSchema::new(
        "gadget",
        vec![
            ("name".to_string(), FieldKind::String),
            ("weight".to_string(), FieldKind::Float),
        ],
        CollectionOptions {
            draft_and_publish: false,
            localized: false,
            stable_identity: true,
        },
    )
}

/// The usual configured locale set: en (default), es, fr
pub fn default_locales() -> Vec<LocaleInfo> {
    vec![
        LocaleInfo { code: "en".to_string(), name: "English".to_string(), is_default: true },
        LocaleInfo { code: "es".to_string(), name: "Spanish".to_string(), is_default: false },
        LocaleInfo { code: "fr".to_string(), name: "French".to_string(), is_default: false },
    ]
}

/// A fresh store with the default locale set registered
pub fn store_with_locales() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.set_locales(default_locales());
    store
}

/// Raw JSON for a published source-locale article
pub fn published_article(id: i64, document_id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "documentId": document_id,
        "locale": "en",
        "title": title,
        "summary": format!("Summary of {}", title),
        "views": 42,
        "publishedAt": "2024-03-01T10:00:00.000Z",
    })
}

/// Wire a replication engine over a memory store and the given provider
pub fn engine_with(store: Arc<MemoryStore>, provider: MockProvider) -> ReplicationEngine {
    let content_store: Arc<dyn ContentStore> = store.clone();
    let registry: Arc<dyn LocaleRegistry> = store;
    ReplicationEngine::new(content_store, registry, TranslationService::new(Arc::new(provider)))
}
