/*!
 * Tests for the replication orchestrator
 */

use serde_json::json;

use locweave::errors::ReplicationError;
use locweave::providers::mock::MockProvider;
use locweave::store::memory::{ResponseShape, StoreQuirks};

use crate::common::{
    article_schema, engine_with, gadget_schema, landing_schema, published_article,
    store_with_locales,
};

#[tokio::test]
async fn test_replicateAll_withOnePublishedEntry_shouldCreateOneVariant() {
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!(report.success, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped, 0);
    assert!(report.errors.is_empty());

    // Exactly one new physical record, sharing the document identity
    assert_eq!(store.entry_count("article"), 2);
    let variant = store.entry_snapshot("article", 2).unwrap();
    assert_eq!(variant.document_id.as_deref(), Some("doc-1"));
    assert_eq!(variant.locale.as_deref(), Some("es"));
    assert_eq!(variant.fields["title"], json!("[es] Hello"));
    // Published in the same call, not as a separate step
    assert!(variant.has_publish_timestamp());
}

#[tokio::test]
async fn test_replicateAll_runTwice_shouldSkipOnSecondRun() {
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let first = engine.replicate_all("es", "en").await.unwrap();
    assert_eq!((first.success, first.failed, first.skipped), (1, 0, 0));

    let second = engine.replicate_all("es", "en").await.unwrap();
    assert_eq!((second.success, second.failed, second.skipped), (0, 0, 1));

    // Still exactly one variant
    assert_eq!(store.entry_count("article"), 2);
}

#[tokio::test]
async fn test_replicateAll_withMissingDocumentId_shouldFailThatEntry() {
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", json!({
        "id": 1,
        "locale": "en",
        "title": "Orphan",
        "publishedAt": "2024-03-01T10:00:00.000Z",
    })).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!((report.success, report.failed, report.skipped), (0, 1, 0));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].collection, "article");
    assert_eq!(report.errors[0].entry_id, 1);
    assert!(report.errors[0].error.contains("documentId"));
    assert_eq!(store.entry_count("article"), 1);
}

#[tokio::test]
async fn test_replicateAll_withNonSourceLocaleEntry_shouldSkipWithoutTranslating() {
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", json!({
        "id": 1,
        "documentId": "doc-1",
        "locale": "fr",
        "title": "Bonjour",
        "publishedAt": "2024-03-01T10:00:00.000Z",
    })).unwrap();

    let provider = MockProvider::working();
    let engine = engine_with(store.clone(), provider.clone());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!((report.success, report.failed, report.skipped), (0, 0, 1));
    // Never attempted for translation, regardless of publication state
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_replicateAll_withUnpublishedEntry_shouldSkip() {
    // A collection without draft/publish surfaces all rows at discovery;
    // the orchestrator still applies the publication predicate per entry
    let store = store_with_locales();
    let mut schema = gadget_schema();
    schema.options.localized = true;
    store.add_collection(schema);
    store.seed_entry("gadget", json!({
        "id": 1, "documentId": "g-1", "locale": "en",
        "name": "Widget", "published": false,
    })).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!((report.success, report.failed, report.skipped), (0, 0, 1));
    assert_eq!(store.entry_count("gadget"), 1);
}

#[tokio::test]
async fn test_replicateAll_withNonLocalizedCollection_shouldSkipAllItsEntries() {
    let store = store_with_locales();
    store.add_collection(gadget_schema());
    store.seed_entry("gadget", json!({"id": 1, "documentId": "g-1", "name": "Widget"})).unwrap();
    store.seed_entry("gadget", json!({"id": 2, "documentId": "g-2", "name": "Gizmo"})).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!((report.success, report.failed, report.skipped), (0, 0, 2));
    assert_eq!(store.entry_count("gadget"), 2);
}

#[tokio::test]
async fn test_replicateAll_withUnconfiguredTargetLocale_shouldFailBeforeAnyWrite() {
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let result = engine.replicate_all("pl", "en").await;

    assert!(matches!(result, Err(ReplicationError::UnconfiguredLocale(ref code)) if code == "pl"));
    assert_eq!(store.entry_count("article"), 1);
}

#[tokio::test]
async fn test_replicateAll_withFailingProvider_shouldStillCreateVariantWithOriginalText() {
    // Translation is fail-open: provider errors degrade the text, they do
    // not block the structural write
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();

    let engine = engine_with(store.clone(), MockProvider::failing());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!((report.success, report.failed, report.skipped), (1, 0, 0));
    let variant = store.entry_snapshot("article", 2).unwrap();
    assert_eq!(variant.fields["title"], json!("Hello"));
    assert_eq!(variant.locale.as_deref(), Some("es"));
}

#[tokio::test]
async fn test_replicateAll_withIdentityIgnoringStore_shouldRecordIntegrityFailure() {
    let store = store_with_locales();
    store.add_collection_with(
        article_schema(),
        ResponseShape::Bare,
        StoreQuirks { ignores_requested_identity: true, ..StoreQuirks::default() },
    );
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!((report.success, report.failed, report.skipped), (0, 1, 0));
    assert!(report.errors[0].error.contains("documentId"));
}

#[tokio::test]
async fn test_replicateAll_shouldHealSourcePublicationWhenTimestampMissing() {
    // Published by the status indicator, but the raw timestamp is unset
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", json!({
        "id": 1,
        "documentId": "doc-1",
        "locale": "en",
        "title": "Hello",
        "status": "published",
    })).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!(report.success, 1);
    let source = store.entry_snapshot("article", 1).unwrap();
    assert!(source.has_publish_timestamp());
}

#[tokio::test]
async fn test_replicateAll_withLegacyCollection_shouldAssignFreshIdentityAndLinkBothWays() {
    let store = store_with_locales();
    store.add_collection(landing_schema());
    store.seed_entry("landing", json!({
        "id": 1,
        "documentId": "land-1",
        "locale": "en",
        "headline": "Welcome",
        "publishedAt": "2024-03-01T10:00:00.000Z",
    })).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!((report.success, report.failed, report.skipped), (1, 0, 0));

    let variant = store.entry_snapshot("landing", 2).unwrap();
    // Fresh identity, deliberately not the source's
    assert!(variant.document_id.is_some());
    assert_ne!(variant.document_id.as_deref(), Some("land-1"));
    assert_eq!(variant.fields["headline"], json!("[es] Welcome"));

    // Symmetric two-way link
    let source = store.entry_snapshot("landing", 1).unwrap();
    assert_eq!(source.linked_ids(), vec![2]);
    assert_eq!(variant.linked_ids(), vec![1]);
}

#[tokio::test]
async fn test_replicateAll_withLegacyLinkNamingTargetLocale_shouldSkipViaPreCheck() {
    let store = store_with_locales();
    store.add_collection(landing_schema());
    store.seed_entry("landing", json!({
        "id": 1,
        "documentId": "land-1",
        "locale": "en",
        "headline": "Welcome",
        "publishedAt": "2024-03-01T10:00:00.000Z",
        "localizations": [{"id": 2, "locale": "es"}],
    })).unwrap();
    store.seed_entry("landing", json!({
        "id": 2,
        "documentId": "land-2",
        "locale": "es",
        "headline": "Bienvenido",
        "publishedAt": "2024-03-01T10:00:00.000Z",
    })).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let report = engine.replicate_all("es", "en").await.unwrap();

    // Source skipped via the link pre-check, the es variant skipped as
    // non-source locale; nothing new is created
    assert_eq!((report.success, report.failed, report.skipped), (0, 0, 2));
    assert_eq!(store.entry_count("landing"), 2);
}

#[tokio::test]
async fn test_replicateAll_withOneBadEntry_shouldContinueWithTheRest() {
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", json!({
        "id": 1,
        "locale": "en",
        "title": "Orphan",
        "publishedAt": "2024-03-01T10:00:00.000Z",
    })).unwrap();
    store.seed_entry("article", published_article(2, "doc-2", "Good")).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let report = engine.replicate_all("es", "en").await.unwrap();

    assert_eq!((report.success, report.failed, report.skipped), (1, 1, 0));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].entry_id, 1);
}

#[tokio::test]
async fn test_translateSingleEntry_shouldTranslateWithoutWriting() {
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();

    let engine = engine_with(store.clone(), MockProvider::working());
    let translated = engine.translate_single_entry("article", 1, "fr", "en").await.unwrap();

    assert_eq!(translated.fields["title"], json!("[fr] Hello"));
    assert_eq!(store.entry_count("article"), 1);
}

#[tokio::test]
async fn test_translateSingleEntry_withUnknownId_shouldError() {
    let store = store_with_locales();
    store.add_collection(article_schema());

    let engine = engine_with(store.clone(), MockProvider::working());
    let result = engine.translate_single_entry("article", 99, "fr", "en").await;
    assert!(matches!(result, Err(ReplicationError::EntryNotFound(99))));
}

#[tokio::test]
async fn test_availableLocales_shouldExcludeDefaultAndSource() {
    let store = store_with_locales();
    let engine = engine_with(store, MockProvider::working());

    let locales = engine.available_locales("en").await.unwrap();
    let codes: Vec<&str> = locales.iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes, vec!["es", "fr"]);
}
