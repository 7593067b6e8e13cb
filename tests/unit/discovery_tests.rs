/*!
 * Tests for content discovery and its fetch-strategy cascade
 */

use serde_json::json;

use locweave::replication::ContentDiscovery;
use locweave::store::ContentStore;
use locweave::store::memory::{ResponseShape, StoreQuirks};
use locweave::store::model::Entry;

use crate::common::{article_schema, gadget_schema, landing_schema, published_article, store_with_locales};

#[tokio::test]
async fn test_discover_withHealthyStore_shouldUseLiveFetch() {
    let store = store_with_locales();
    store.add_collection(article_schema());
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();
    store.seed_entry("article", json!({"id": 2, "documentId": "doc-2", "locale": "en", "title": "Draft"})).unwrap();

    let discovery = ContentDiscovery::new(store.as_ref());
    let discovered = discovery.discover().await.unwrap();

    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered[0].schema.name, "article");
    // Only the published entry is eligible
    assert_eq!(discovered[0].entries.len(), 1);
    assert_eq!(discovered[0].entries[0].id, 1);
}

#[tokio::test]
async fn test_discover_withBrokenLiveFilter_shouldFallBackToPublishedFilter() {
    let store = store_with_locales();
    store.add_collection_with(
        article_schema(),
        ResponseShape::Bare,
        StoreQuirks { live_filter_returns_nothing: true, ..StoreQuirks::default() },
    );
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();

    let discovery = ContentDiscovery::new(store.as_ref());
    let discovered = discovery.discover().await.unwrap();

    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered[0].entries.len(), 1);
}

#[tokio::test]
async fn test_discover_withBothFiltersBroken_shouldFetchAllAndFilterClientSide() {
    let store = store_with_locales();
    store.add_collection_with(
        article_schema(),
        ResponseShape::Bare,
        StoreQuirks {
            live_filter_returns_nothing: true,
            published_filter_returns_nothing: true,
            ..StoreQuirks::default()
        },
    );
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();
    store.seed_entry("article", json!({"id": 2, "documentId": "doc-2", "locale": "en", "title": "Draft"})).unwrap();

    let discovery = ContentDiscovery::new(store.as_ref());
    let discovered = discovery.discover().await.unwrap();

    assert_eq!(discovered.len(), 1);
    let ids: Vec<i64> = discovered[0].entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn test_discover_withApiHidingRows_shouldFallBackToRawQuery() {
    let store = store_with_locales();
    store.add_collection_with(
        article_schema(),
        ResponseShape::Bare,
        StoreQuirks { hidden_from_api: true, ..StoreQuirks::default() },
    );
    store.seed_entry("article", published_article(1, "doc-1", "Hello")).unwrap();
    store.seed_entry("article", json!({"id": 2, "locale": "en", "title": "Draft", "published": false})).unwrap();

    let discovery = ContentDiscovery::new(store.as_ref());
    let discovered = discovery.discover().await.unwrap();

    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered[0].entries.len(), 1);
    assert_eq!(discovered[0].entries[0].id, 1);
}

#[tokio::test]
async fn test_discover_withFailingCollection_shouldSkipItAndKeepOthers() {
    let store = store_with_locales();
    store.add_collection_with(
        article_schema(),
        ResponseShape::Bare,
        StoreQuirks { reads_fail: true, ..StoreQuirks::default() },
    );
    store.add_collection(landing_schema());
    store.seed_entry("article", published_article(1, "doc-1", "Unreachable")).unwrap();
    store.seed_entry("landing", json!({
        "id": 10, "documentId": "doc-10", "locale": "en",
        "headline": "Landing", "publishedAt": "2024-03-01T10:00:00.000Z",
    })).unwrap();

    let discovery = ContentDiscovery::new(store.as_ref());
    let discovered = discovery.discover().await.unwrap();

    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered[0].schema.name, "landing");
}

#[tokio::test]
async fn test_discover_withoutDraftPublish_shouldTreatExistenceAsEligibility() {
    let store = store_with_locales();
    store.add_collection(gadget_schema());
    store.seed_entry("gadget", json!({"id": 1, "documentId": "g-1", "name": "Widget"})).unwrap();
    store.seed_entry("gadget", json!({"id": 2, "documentId": "g-2", "name": "Gizmo"})).unwrap();

    let discovery = ContentDiscovery::new(store.as_ref());
    let discovered = discovery.discover().await.unwrap();

    // No publication filtering at all for such collections
    assert_eq!(discovered.len(), 1);
    assert_eq!(discovered[0].entries.len(), 2);
}

#[tokio::test]
async fn test_discover_shouldNormalizeEveryResponseShape() {
    for shape in [
        ResponseShape::Bare,
        ResponseShape::Paginated,
        ResponseShape::Wrapped,
        ResponseShape::SingleWhenAlone,
    ] {
        let store = store_with_locales();
        store.add_collection_with(article_schema(), shape, StoreQuirks::default());
        store.seed_entry("article", published_article(1, "doc-1", "Shaped")).unwrap();

        let discovery = ContentDiscovery::new(store.as_ref());
        let discovered = discovery.discover().await.unwrap();

        assert_eq!(discovered.len(), 1, "shape {:?}", shape);
        assert_eq!(discovered[0].entries.len(), 1, "shape {:?}", shape);
        assert_eq!(discovered[0].entries[0].document_id.as_deref(), Some("doc-1"));
    }
}

#[tokio::test]
async fn test_discover_clientSideFiltering_shouldAgreeWithPublicationPredicate() {
    // Exercise every combination of the publication indicators through the
    // fetch-all strategy and check the discovered set matches the predicate
    let store = store_with_locales();
    store.add_collection_with(
        article_schema(),
        ResponseShape::Bare,
        StoreQuirks {
            live_filter_returns_nothing: true,
            published_filter_returns_nothing: true,
            ..StoreQuirks::default()
        },
    );

    let timestamps = [Some(json!("2024-03-01T10:00:00.000Z")), Some(json!(null)), None];
    let flags = [Some(true), Some(false), None];
    let statuses = [Some("published"), Some("draft"), None];

    let mut id = 0i64;
    for ts in &timestamps {
        for flag in &flags {
            for status in &statuses {
                id += 1;
                let mut raw = json!({"id": id, "documentId": format!("doc-{}", id), "locale": "en"});
                if let Some(ts) = ts {
                    raw["publishedAt"] = ts.clone();
                }
                if let Some(flag) = flag {
                    raw["published"] = json!(flag);
                }
                if let Some(status) = status {
                    raw["status"] = json!(status);
                }
                store.seed_entry("article", raw).unwrap();
            }
        }
    }

    let discovery = ContentDiscovery::new(store.as_ref());
    let discovered = discovery.discover().await.unwrap();
    let discovered_ids: Vec<i64> = discovered[0].entries.iter().map(|e| e.id).collect();

    let all: Vec<Entry> = store.query_raw("article").await.unwrap();
    let expected_ids: Vec<i64> = all.iter()
        .filter(|entry| entry.is_published())
        .map(|entry| entry.id)
        .collect();

    assert_eq!(discovered_ids, expected_ids);
}
