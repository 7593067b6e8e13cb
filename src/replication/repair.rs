/*!
 * Cross-locale link repair.
 *
 * Link sets rot in two independent ways: an entry ends up linking to
 * itself, or a link points at a record that no longer exists. Both defects
 * are detected and corrected here, directly against the store. An entry
 * that does not exist is a no-op, not an error.
 */

use log::{error, info, warn};

use crate::errors::StoreError;
use crate::store::model::EntryId;
use crate::store::ContentStore;

/// What one repair pass found and fixed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Whether the entry existed at all
    pub found: bool,

    /// Self-references removed from the link set
    pub self_references_removed: usize,

    /// Dangling references removed from the link set
    pub dangling_removed: usize,

    /// Non-fatal findings (e.g. a linked entry missing its document
    /// identity); repair of the other defects still proceeded
    pub warnings: Vec<String>,
}

/// Per-collection identity audit result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAudit {
    /// Collection name
    pub collection: String,

    /// Physical rows inspected, all locales
    pub total: usize,

    /// Ids of rows missing a document identity
    pub missing: Vec<EntryId>,
}

/// Inspects and repairs one entry's cross-locale link set
pub struct LinkRepairer<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> LinkRepairer<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Repair one entry's link set.
    ///
    /// Self-references and dangling references are corrected
    /// independently; each removal is persisted as it is found. Findings
    /// that are not defects of the link set itself are reported as
    /// warnings without stopping the repair.
    pub async fn repair_entry(&self, collection: &str, entry_id: EntryId) -> Result<RepairOutcome, StoreError> {
        info!("Diagnosing localization links for '{}' entry {}", collection, entry_id);

        let mut outcome = RepairOutcome::default();

        let Some(entry) = self.store.find_entry(collection, entry_id, true).await? else {
            warn!("Entry {} not found - nothing to repair", entry_id);
            return Ok(outcome);
        };
        outcome.found = true;

        if entry.document_id.is_none() {
            let finding = format!("entry {} is missing documentId", entry_id);
            error!("{}", finding);
            outcome.warnings.push(finding);
        }

        let mut links = entry.linked_ids();

        // Self-reference
        if links.contains(&entry_id) {
            warn!("Entry {} has a self-reference in its link set", entry_id);
            let before = links.len();
            links.retain(|&id| id != entry_id);
            outcome.self_references_removed = before - links.len();
            self.store.update_links(collection, entry_id, &links).await?;
            info!("Removed self-reference for entry {}", entry_id);
        }

        // Dangling references
        for link_id in links.clone() {
            match self.store.find_entry(collection, link_id, false).await {
                Ok(None) => {
                    warn!("Linked entry {} not found - removing from link set", link_id);
                    links.retain(|&id| id != link_id);
                    self.store.update_links(collection, entry_id, &links).await?;
                    outcome.dangling_removed += 1;
                }
                Ok(Some(linked)) => {
                    if linked.document_id.is_none() {
                        let finding = format!("linked entry {} is missing documentId", link_id);
                        error!("{}", finding);
                        outcome.warnings.push(finding);
                    }
                }
                Err(e) => {
                    error!("Failed to check linked entry {}: {}", link_id, e);
                }
            }
        }

        info!("Repair complete for '{}' entry {}: {} self-reference(s), {} dangling link(s) removed",
              collection, entry_id, outcome.self_references_removed, outcome.dangling_removed);
        Ok(outcome)
    }

    /// Repair every entry of one collection
    pub async fn repair_collection(&self, collection: &str) -> Result<Vec<(EntryId, RepairOutcome)>, StoreError> {
        let entries = self.store.query_raw(collection).await?;
        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            let outcome = self.repair_entry(collection, entry.id).await?;
            outcomes.push((entry.id, outcome));
        }
        Ok(outcomes)
    }

    /// Count entries missing a document identity, all locales included
    pub async fn audit_collection(&self, collection: &str) -> Result<IdentityAudit, StoreError> {
        let entries = self.store.query_raw(collection).await?;
        let total = entries.len();
        let missing: Vec<EntryId> = entries.iter()
            .filter(|entry| entry.document_id.is_none())
            .map(|entry| entry.id)
            .collect();

        if missing.is_empty() {
            info!("All {} entries in '{}' carry documentIds", total, collection);
        } else {
            error!("{} of {} entries in '{}' are missing documentIds",
                   missing.len(), total, collection);
        }

        Ok(IdentityAudit {
            collection: collection.to_string(),
            total,
            missing,
        })
    }
}
