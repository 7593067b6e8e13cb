/*!
 * Locale-variant creation.
 *
 * Two identity schemes exist in the field and both must be supported. The
 * stable-identity scheme carries the source's document identity onto the
 * new record, keeping one logical document's variants linked by a shared
 * key. The legacy scheme forces a freshly assigned identity and maintains
 * a symmetric two-way link list instead. A collection uses exactly one
 * scheme, chosen by its capability flag - the two are never mixed.
 */

use async_trait::async_trait;
use log::{error, info, warn};
use serde_json::{Map, Value};

use crate::errors::StoreError;
use crate::store::model::{CollectionOptions, Entry};
use crate::store::{ContentStore, NewEntry};

/// Strategy for creating a locale variant under one identity scheme
#[async_trait]
pub trait IdentityScheme: Send + Sync {
    /// Scheme name for logs
    fn name(&self) -> &'static str;

    /// Create the target-locale record for `source`, carrying `fields`
    /// (already stripped of store-managed fields). When `publish` is set
    /// the record is created in the published state in the same call, so
    /// there is no window where the variant exists but is invisible.
    ///
    /// The created record is verified against what was requested; a
    /// mismatch is a structural integrity fault, not a translation issue.
    async fn write_variant(
        &self,
        store: &dyn ContentStore,
        collection: &str,
        source: &Entry,
        fields: Map<String, Value>,
        target_locale: &str,
        publish: bool,
    ) -> Result<Entry, StoreError>;
}

/// Preferred scheme: the variant shares the source's document identity
pub struct StableIdentity;

/// Legacy scheme: fresh identity plus a symmetric two-way link list
pub struct LinkList;

/// Resolve the scheme for a collection from its capability flag
pub fn scheme_for(options: &CollectionOptions) -> &'static dyn IdentityScheme {
    if options.stable_identity {
        &StableIdentity
    } else {
        &LinkList
    }
}

fn verify_locale(created: &Entry, target_locale: &str) -> Result<(), StoreError> {
    if created.locale.as_deref() != Some(target_locale) {
        let message = format!(
            "locale variant {} has wrong locale: expected '{}', got '{}'",
            created.id,
            target_locale,
            created.locale.as_deref().unwrap_or("<none>"),
        );
        error!("CRITICAL: {}", message);
        return Err(StoreError::Integrity(message));
    }
    Ok(())
}

#[async_trait]
impl IdentityScheme for StableIdentity {
    fn name(&self) -> &'static str {
        "stable-identity"
    }

    async fn write_variant(
        &self,
        store: &dyn ContentStore,
        collection: &str,
        source: &Entry,
        fields: Map<String, Value>,
        target_locale: &str,
        publish: bool,
    ) -> Result<Entry, StoreError> {
        let document_id = source.document_id.clone()
            .ok_or_else(|| StoreError::WriteFailed("source entry has no document identity".to_string()))?;

        let created = store.create_entry(collection, NewEntry {
            document_id: Some(document_id.clone()),
            locale: target_locale.to_string(),
            publish,
            fields,
        }).await?;

        if created.document_id.as_deref() != Some(document_id.as_str()) {
            let message = format!(
                "locale variant {} has wrong documentId: expected '{}', got '{}'",
                created.id,
                document_id,
                created.document_id.as_deref().unwrap_or("<none>"),
            );
            error!("CRITICAL: {}", message);
            return Err(StoreError::Integrity(message));
        }
        verify_locale(&created, target_locale)?;

        info!("Created '{}' locale variant for '{}' documentId {} - id {}",
              target_locale, collection, document_id, created.id);
        Ok(created)
    }
}

#[async_trait]
impl IdentityScheme for LinkList {
    fn name(&self) -> &'static str {
        "link-list"
    }

    async fn write_variant(
        &self,
        store: &dyn ContentStore,
        collection: &str,
        source: &Entry,
        fields: Map<String, Value>,
        target_locale: &str,
        publish: bool,
    ) -> Result<Entry, StoreError> {
        // The document identity is deliberately omitted so the store
        // assigns a fresh one
        let created = store.create_entry(collection, NewEntry {
            document_id: None,
            locale: target_locale.to_string(),
            publish,
            fields,
        }).await?;

        if created.document_id.is_some() && created.document_id == source.document_id {
            let message = format!(
                "locale variant {} kept the source's documentId '{}' despite a fresh identity being requested",
                created.id,
                source.document_id.as_deref().unwrap_or("<none>"),
            );
            error!("CRITICAL: {}", message);
            return Err(StoreError::Integrity(message));
        }
        verify_locale(&created, target_locale)?;

        // Symmetric two-way link: source -> variant, variant -> source.
        // Link failures degrade to a warning; the variant itself exists.
        if let Err(e) = self.link_both_ways(store, collection, source, &created).await {
            warn!("Failed to link localizations for entry {}: {}", source.id, e);
        }

        info!("Created '{}' locale variant for '{}' entry {} - new id {}",
              target_locale, collection, source.id, created.id);
        Ok(created)
    }
}

impl LinkList {
    async fn link_both_ways(
        &self,
        store: &dyn ContentStore,
        collection: &str,
        source: &Entry,
        created: &Entry,
    ) -> Result<(), StoreError> {
        // Re-read the source so concurrent link updates are not clobbered
        let current = store.find_entry(collection, source.id, true).await?
            .unwrap_or_else(|| source.clone());

        let mut links: Vec<_> = current.linked_ids().into_iter()
            .filter(|&id| id != source.id)
            .collect();
        if !links.contains(&created.id) {
            links.push(created.id);
            store.update_links(collection, source.id, &links).await?;
            store.update_links(collection, created.id, &[source.id]).await?;
        }
        Ok(())
    }
}
