/*!
 * Tests for the variant writer and its identity schemes
 */

use serde_json::{Map, Value, json};

use locweave::errors::StoreError;
use locweave::replication::writer::{IdentityScheme, LinkList, StableIdentity, scheme_for};
use locweave::store::ContentStore;
use locweave::store::memory::{ResponseShape, StoreQuirks};
use locweave::store::model::Entry;

use crate::common::{article_schema, landing_schema, published_article, store_with_locales};

fn fields_with_title(title: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("title".to_string(), json!(title));
    fields
}

fn source_entry() -> Entry {
    Entry::from_value(&published_article(1, "doc-1", "Hello")).unwrap()
}

#[test]
fn test_schemeFor_shouldDispatchOnCapabilityFlag() {
    let stable = article_schema();
    let legacy = landing_schema();
    assert_eq!(scheme_for(&stable.options).name(), "stable-identity");
    assert_eq!(scheme_for(&legacy.options).name(), "link-list");
}

#[tokio::test]
async fn test_stableScheme_shouldPreserveDocumentIdentity() {
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();

    let created = StableIdentity
        .write_variant(store.as_ref(), "article", &source_entry(), fields_with_title("Hola"), "es", true)
        .await
        .unwrap();

    assert_eq!(created.document_id.as_deref(), Some("doc-1"));
    assert_eq!(created.locale.as_deref(), Some("es"));
    assert!(created.has_publish_timestamp());
    assert_eq!(created.fields["title"], json!("Hola"));
}

#[tokio::test]
async fn test_stableScheme_withUnpublishedFlag_shouldCreateDraft() {
    let store = store_with_locales();
    store.add_collection(article_schema());

    let created = StableIdentity
        .write_variant(store.as_ref(), "article", &source_entry(), fields_with_title("Hola"), "es", false)
        .await
        .unwrap();

    assert!(!created.has_publish_timestamp());
}

#[tokio::test]
async fn test_stableScheme_withIdentityIgnoringStore_shouldReportIntegrityFault() {
    let store = store_with_locales();
    store.add_collection_with(
        article_schema(),
        ResponseShape::Bare,
        StoreQuirks { ignores_requested_identity: true, ..StoreQuirks::default() },
    );

    let result = StableIdentity
        .write_variant(store.as_ref(), "article", &source_entry(), fields_with_title("Hola"), "es", true)
        .await;

    assert!(matches!(result, Err(StoreError::Integrity(_))));
}

#[tokio::test]
async fn test_linkListScheme_shouldAssignFreshIdentity() {
    let store = store_with_locales();
    store.add_collection(landing_schema());
    let source_id = store.seed_entry("landing", json!({
        "id": 1,
        "documentId": "land-1",
        "locale": "en",
        "headline": "Welcome",
        "publishedAt": "2024-03-01T10:00:00.000Z",
    })).unwrap();
    let source = store.find_entry("landing", source_id, true).await.unwrap().unwrap();

    let created = LinkList
        .write_variant(store.as_ref(), "landing", &source, fields_with_title("Bienvenido"), "es", true)
        .await
        .unwrap();

    assert!(created.document_id.is_some());
    assert_ne!(created.document_id.as_deref(), Some("land-1"));
    assert_eq!(created.locale.as_deref(), Some("es"));
}

#[tokio::test]
async fn test_linkListScheme_shouldLinkSourceAndVariantSymmetrically() {
    let store = store_with_locales();
    store.add_collection(landing_schema());
    store.seed_entry("landing", json!({
        "id": 1,
        "documentId": "land-1",
        "locale": "en",
        "headline": "Welcome",
        "publishedAt": "2024-03-01T10:00:00.000Z",
        "localizations": [{"id": 7, "locale": "de"}],
    })).unwrap();
    store.seed_entry("landing", json!({
        "id": 7,
        "documentId": "land-7",
        "locale": "de",
        "headline": "Willkommen",
    })).unwrap();
    let source = store.find_entry("landing", 1, true).await.unwrap().unwrap();

    let created = LinkList
        .write_variant(store.as_ref(), "landing", &source, fields_with_title("Bienvenido"), "es", true)
        .await
        .unwrap();

    // Existing links are kept, the new variant appended, and the variant
    // links back to its source
    let source_after = store.entry_snapshot("landing", 1).unwrap();
    assert_eq!(source_after.linked_ids(), vec![7, created.id]);
    let variant_after = store.entry_snapshot("landing", created.id).unwrap();
    assert_eq!(variant_after.linked_ids(), vec![1]);
}
