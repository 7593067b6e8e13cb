/*!
 * The top-level replication loop.
 *
 * For each discovered collection, for each eligible source-locale entry:
 * decide skip or replicate, translate, write the locale variant, and
 * account for the outcome. A single bad entry never aborts the batch - its
 * error is recorded and processing continues. Only an unregistered target
 * locale aborts the run, and it does so before any write happens.
 */

use std::fmt;
use std::sync::Arc;

use log::{error, info, warn};
use once_cell::sync::Lazy;

use crate::errors::ReplicationError;
use crate::replication::discovery::ContentDiscovery;
use crate::replication::writer::scheme_for;
use crate::store::model::{CollectionSchema, Entry, EntryId};
use crate::store::{ContentStore, EntryQuery, LocaleInfo, LocaleRegistry};
use crate::translation::service::TranslationService;

/// Fields the store manages itself; they are stripped from a translated
/// copy before it is handed to the writer
static STORE_MANAGED_FIELDS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["createdAt", "updatedAt", "publishedAt"]);

/// One recorded per-entry failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationFailure {
    /// Collection the entry belongs to
    pub collection: String,
    /// Store-assigned id of the entry
    pub entry_id: EntryId,
    /// Human-readable error
    pub error: String,
}

/// Counters and per-entry errors for one replication run
#[derive(Debug, Clone, Default)]
pub struct ReplicationReport {
    /// Variants created
    pub success: u32,
    /// Entries that errored
    pub failed: u32,
    /// Entries skipped (already replicated, wrong locale, unpublished,
    /// or collection not localized)
    pub skipped: u32,
    /// Per-entry failures, in processing order
    pub errors: Vec<ReplicationFailure>,
}

impl ReplicationReport {
    fn record_failure(&mut self, collection: &str, entry_id: EntryId, error: String) {
        self.failed += 1;
        self.errors.push(ReplicationFailure {
            collection: collection.to_string(),
            entry_id,
            error,
        });
    }
}

impl fmt::Display for ReplicationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed, {} skipped",
               self.success, self.failed, self.skipped)
    }
}

/// Whether one entry produced a variant or was skipped
enum EntryOutcome {
    Replicated,
    Skipped,
}

/// The replication engine. All collaborators are injected; the engine
/// holds no ambient state.
pub struct ReplicationEngine {
    store: Arc<dyn ContentStore>,
    registry: Arc<dyn LocaleRegistry>,
    translator: TranslationService,
}

impl fmt::Debug for ReplicationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicationEngine")
            .field("translator", &self.translator)
            .finish()
    }
}

impl ReplicationEngine {
    pub fn new(
        store: Arc<dyn ContentStore>,
        registry: Arc<dyn LocaleRegistry>,
        translator: TranslationService,
    ) -> Self {
        Self { store, registry, translator }
    }

    /// Replicate every eligible entry into `target_locale`.
    ///
    /// Fails before touching any content when the target locale is not in
    /// the store's configured locale set. Everything after that point is
    /// contained per entry or per collection.
    pub async fn replicate_all(&self, target_locale: &str, source_locale: &str)
        -> Result<ReplicationReport, ReplicationError>
    {
        let locales = self.registry.locales().await?;
        let configured: Vec<&str> = locales.iter().map(|l| l.code.as_str()).collect();
        info!("Configured locales: {}", configured.join(", "));

        if !configured.iter().any(|&code| code == target_locale) {
            error!("Target locale '{}' is not configured in the store. Available: {}",
                   target_locale, configured.join(", "));
            return Err(ReplicationError::UnconfiguredLocale(target_locale.to_string()));
        }

        let mut report = ReplicationReport::default();

        let discovery = ContentDiscovery::new(self.store.as_ref());
        let collections = discovery.discover().await?;
        if collections.is_empty() {
            warn!("No published content found to replicate");
            return Ok(report);
        }

        for content in &collections {
            let schema = &content.schema;

            if !schema.options.localized {
                info!("Skipping '{}' - localization not enabled", schema.name);
                report.skipped += content.entries.len() as u32;
                continue;
            }

            info!("Processing {} entries from '{}' for replication to '{}'",
                  content.entries.len(), schema.name, target_locale);

            for entry in &content.entries {
                match self.replicate_entry(schema, entry, target_locale, source_locale).await {
                    Ok(EntryOutcome::Replicated) => report.success += 1,
                    Ok(EntryOutcome::Skipped) => report.skipped += 1,
                    Err(e) => {
                        error!("Failed to process '{}' entry {}: {}", schema.name, entry.id, e);
                        report.record_failure(&schema.name, entry.id, e.to_string());
                    }
                }
            }
        }

        info!("Replication complete: {}", report);
        Ok(report)
    }

    /// The per-entry state machine. Every error that escapes here is
    /// caught by the caller and turned into a recorded failure.
    async fn replicate_entry(
        &self,
        schema: &CollectionSchema,
        entry: &Entry,
        target_locale: &str,
        source_locale: &str,
    ) -> Result<EntryOutcome, ReplicationError> {
        // Only source-locale entries seed replication; locale variants are
        // never themselves re-replicated
        if let Some(locale) = &entry.locale {
            if locale != source_locale {
                info!("Skipping '{}' entry {} - not source locale ({})",
                      schema.name, entry.id, locale);
                return Ok(EntryOutcome::Skipped);
            }
        }

        // Same predicate discovery used - the two passes must agree
        if !entry.is_published() {
            info!("Skipping '{}' entry {} - not published", schema.name, entry.id);
            return Ok(EntryOutcome::Skipped);
        }

        let Some(document_id) = &entry.document_id else {
            return Err(ReplicationError::MissingIdentity { entry_id: entry.id });
        };

        if self.variant_exists(schema, entry, document_id, target_locale).await? {
            info!("Locale variant already exists for '{}' documentId {} in '{}' - skipping",
                  schema.name, document_id, target_locale);
            return Ok(EntryOutcome::Skipped);
        }

        let translated = self.translator
            .translate_entry(entry, schema, source_locale, target_locale)
            .await;

        let mut fields = translated.fields;
        for managed in STORE_MANAGED_FIELDS.iter() {
            fields.remove(*managed);
        }

        // Discovery only surfaces published entries for draft/publish
        // collections, so the variant publishes with its source
        let publish = entry.is_published();

        let scheme = scheme_for(&schema.options);
        scheme
            .write_variant(self.store.as_ref(), &schema.name, entry, fields, target_locale, publish)
            .await?;

        // The source was classified published without a raw timestamp;
        // heal it so the pair does not drift apart. Best-effort only.
        if publish && !entry.has_publish_timestamp() {
            if let Err(e) = self.store.publish_entry(&schema.name, entry.id).await {
                warn!("Could not update source entry {} publication status: {}", entry.id, e);
            }
        }

        Ok(EntryOutcome::Replicated)
    }

    /// Idempotence check: does a variant for (document identity, target
    /// locale) already exist? Best-effort, not a transactional guard.
    async fn variant_exists(
        &self,
        schema: &CollectionSchema,
        entry: &Entry,
        document_id: &str,
        target_locale: &str,
    ) -> Result<bool, ReplicationError> {
        // Legacy collections may only record the relationship in the link
        // set; a populated link naming the target locale settles it
        if !schema.options.stable_identity {
            let linked = entry.linked_locales.iter()
                .any(|link| link.locale.as_deref() == Some(target_locale));
            if linked {
                return Ok(true);
            }
        }

        let query = EntryQuery::new()
            .document_id(document_id)
            .locale(target_locale)
            .limit(1);
        let existing = self.store.find_entries(&schema.name, &query).await?.normalize();
        Ok(!existing.is_empty())
    }

    /// Translate one entry addressed by (collection, id) without writing
    /// anything back.
    pub async fn translate_single_entry(
        &self,
        collection: &str,
        entry_id: EntryId,
        target_locale: &str,
        source_locale: &str,
    ) -> Result<Entry, ReplicationError> {
        let entry = self.store.find_entry(collection, entry_id, false).await?
            .ok_or(ReplicationError::EntryNotFound(entry_id))?;
        let schema = self.store.schema(collection).await?;

        Ok(self.translator
            .translate_entry(&entry, &schema, source_locale, target_locale)
            .await)
    }

    /// Configured locales available as replication targets: everything
    /// except the default (source) locale.
    pub async fn available_locales(&self, source_locale: &str) -> Result<Vec<LocaleInfo>, ReplicationError> {
        let locales = self.registry.locales().await?;
        Ok(locales.into_iter()
            .filter(|locale| !locale.is_default && locale.code != source_locale)
            .collect())
    }
}
