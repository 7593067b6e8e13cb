/*!
 * Tests for the translation service
 */

use std::sync::Arc;

use serde_json::json;

use locweave::providers::mock::MockProvider;
use locweave::store::model::Entry;
use locweave::translation::TranslationService;

use crate::common::article_schema;

#[tokio::test]
async fn test_translateText_withWorkingProvider_shouldTranslate() {
    let service = TranslationService::new(Arc::new(MockProvider::working()));
    let result = service.translate_text("Hello", "en", "es").await;
    assert_eq!(result, "[es] Hello");
}

#[tokio::test]
async fn test_translateText_withFailingProvider_shouldReturnExactOriginal() {
    let service = TranslationService::new(Arc::new(MockProvider::failing()));
    let result = service.translate_text("Hello world", "en", "es").await;
    assert_eq!(result, "Hello world");
}

#[tokio::test]
async fn test_translateText_withEmptyText_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let service = TranslationService::new(Arc::new(provider.clone()));

    let result = service.translate_text("", "en", "es").await;
    assert_eq!(result, "");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translateText_withEmptyTarget_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let service = TranslationService::new(Arc::new(provider.clone()));

    let result = service.translate_text("Hello", "en", "").await;
    assert_eq!(result, "Hello");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translateText_shouldUseCacheOnRepeat() {
    let provider = MockProvider::working();
    let service = TranslationService::new(Arc::new(provider.clone()));

    let first = service.translate_text("Hello", "en", "es").await;
    let second = service.translate_text("Hello", "en", "es").await;

    assert_eq!(first, second);
    assert_eq!(provider.request_count(), 1);
    assert_eq!(service.cache_stats(), (1, 1));
}

#[tokio::test]
async fn test_translateTexts_shouldPreserveOrderAndLength() {
    let service = TranslationService::new(Arc::new(MockProvider::working()));
    let texts = vec!["One".to_string(), "Two".to_string(), "Three".to_string()];

    let translated = service.translate_texts(&texts, "en", "fr").await;
    assert_eq!(translated, vec!["[fr] One", "[fr] Two", "[fr] Three"]);
}

#[tokio::test]
async fn test_translateTexts_withIntermittentFailures_shouldDegradePerString() {
    // Every 2nd provider call fails; failed strings keep their original text
    let service = TranslationService::without_cache(Arc::new(MockProvider::intermittent(2)));
    let texts = vec!["One".to_string(), "Two".to_string(), "Three".to_string(), "Four".to_string()];

    let translated = service.translate_texts(&texts, "en", "fr").await;
    assert_eq!(translated.len(), 4);
    let failed = translated.iter().zip(&texts).filter(|(out, input)| out == input).count();
    let succeeded = translated.iter().filter(|out| out.starts_with("[fr] ")).count();
    assert_eq!(failed, 2);
    assert_eq!(succeeded, 2);
}

#[tokio::test]
async fn test_translateEntry_shouldTranslateOnlyTextFields() {
    let service = TranslationService::new(Arc::new(MockProvider::working()));
    let schema = article_schema();
    let entry = Entry::from_value(&json!({
        "id": 1,
        "documentId": "doc-1",
        "locale": "en",
        "title": "Hello",
        "summary": "A greeting",
        "views": 42,
        "slug": "hello",
    })).unwrap();

    let translated = service.translate_entry(&entry, &schema, "en", "es").await;

    assert_eq!(translated.fields["title"], json!("[es] Hello"));
    assert_eq!(translated.fields["summary"], json!("[es] A greeting"));
    // Non-text fields pass through unchanged, as do identifiers
    assert_eq!(translated.fields["views"], json!(42));
    assert_eq!(translated.fields["slug"], json!("hello"));
    assert_eq!(translated.id, 1);
    assert_eq!(translated.document_id.as_deref(), Some("doc-1"));
    assert_eq!(translated.locale.as_deref(), Some("en"));
}

#[tokio::test]
async fn test_translateEntry_shouldNotMutateInput() {
    let service = TranslationService::new(Arc::new(MockProvider::working()));
    let schema = article_schema();
    let entry = Entry::from_value(&json!({
        "id": 1,
        "title": "Hello",
    })).unwrap();

    let _ = service.translate_entry(&entry, &schema, "en", "es").await;
    assert_eq!(entry.fields["title"], json!("Hello"));
}

#[tokio::test]
async fn test_translateEntry_withNestedRichText_shouldRecurse() {
    let service = TranslationService::new(Arc::new(MockProvider::working()));
    let schema = article_schema();
    let entry = Entry::from_value(&json!({
        "id": 1,
        "body": {
            "heading": "Welcome",
            "sections": {
                "intro": "First words",
            },
            "blocks": ["kept", "as-is"],
            "depth": 3,
        },
    })).unwrap();

    let translated = service.translate_entry(&entry, &schema, "en", "es").await;
    let body = &translated.fields["body"];

    assert_eq!(body["heading"], json!("[es] Welcome"));
    assert_eq!(body["sections"]["intro"], json!("[es] First words"));
    // Arrays are never expanded into translatable leaves
    assert_eq!(body["blocks"], json!(["kept", "as-is"]));
    assert_eq!(body["depth"], json!(3));
}

#[tokio::test]
async fn test_translateEntry_withAbsentAndEmptyFields_shouldLeaveThem() {
    let provider = MockProvider::working();
    let service = TranslationService::new(Arc::new(provider.clone()));
    let schema = article_schema();
    let entry = Entry::from_value(&json!({
        "id": 1,
        "title": "",
        "views": 1,
    })).unwrap();

    let translated = service.translate_entry(&entry, &schema, "en", "es").await;
    assert_eq!(translated.fields["title"], json!(""));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_supportedLanguages_withFailingProvider_shouldReturnEmpty() {
    let service = TranslationService::new(Arc::new(MockProvider::failing()));
    assert!(service.supported_languages().await.is_empty());
}
