/*!
 * Discovery of entries eligible for replication.
 *
 * Stores have been observed to return nothing from their "published only"
 * filter while the rows demonstrably exist, so discovery runs a cascade of
 * fetch strategies per collection: each is tried only when the previous one
 * came back empty, and the first non-empty result wins. Strategies are
 * pure reads; results are never combined across strategies.
 */

use log::{debug, info, warn};

use crate::errors::StoreError;
use crate::store::model::{CollectionSchema, Entry};
use crate::store::{ContentStore, EntryQuery, PublicationFilter};

/// One collection together with its eligible entries
#[derive(Debug, Clone)]
pub struct CollectionContent {
    pub schema: CollectionSchema,
    pub entries: Vec<Entry>,
}

/// The fetch strategies, in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchStrategy {
    /// Store-level "published only" filter
    Live,
    /// Explicit filter on the publish timestamp being set
    PublishedFilter,
    /// Unfiltered fetch, publication decided client-side
    FetchAll,
    /// Low-level query bypassing the read API, publication client-side
    RawQuery,
}

const CASCADE: [FetchStrategy; 4] = [
    FetchStrategy::Live,
    FetchStrategy::PublishedFilter,
    FetchStrategy::FetchAll,
    FetchStrategy::RawQuery,
];

/// Enumerates collections and retrieves their eligible entries
pub struct ContentDiscovery<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> ContentDiscovery<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Discover all collections with at least one eligible entry.
    ///
    /// A collection whose schema or fetch fails is skipped for this run
    /// (logged), never fatal to the overall discovery.
    pub async fn discover(&self) -> Result<Vec<CollectionContent>, StoreError> {
        let collections = self.store.collections().await?;
        info!("Found {} collections to check", collections.len());

        let mut discovered = Vec::new();
        for name in collections {
            let schema = match self.store.schema(&name).await {
                Ok(schema) => schema,
                Err(e) => {
                    warn!("Failed to introspect collection '{}': {}", name, e);
                    continue;
                }
            };

            match self.eligible_entries(&schema).await {
                Ok(entries) if !entries.is_empty() => {
                    info!("Found {} eligible entries in '{}'", entries.len(), name);
                    discovered.push(CollectionContent { schema, entries });
                }
                Ok(_) => {
                    debug!("No eligible entries in '{}'", name);
                }
                Err(e) => {
                    warn!("Failed to fetch content for '{}': {}", name, e);
                }
            }
        }

        info!("Total collections with eligible content: {}", discovered.len());
        Ok(discovered)
    }

    /// Retrieve the eligible entries of one collection.
    ///
    /// Collections without a draft/publish lifecycle treat existence as
    /// eligibility. For the rest, the strategy cascade applies.
    pub async fn eligible_entries(&self, schema: &CollectionSchema) -> Result<Vec<Entry>, StoreError> {
        if !schema.options.draft_and_publish {
            let query = EntryQuery::new().populate_links();
            let response = self.store.find_entries(&schema.name, &query).await?;
            return Ok(response.normalize());
        }

        for strategy in CASCADE {
            let entries = self.run_strategy(schema, strategy).await?;
            if !entries.is_empty() {
                debug!("Strategy {:?} yielded {} entries for '{}'",
                       strategy, entries.len(), schema.name);
                return Ok(entries);
            }
            debug!("Strategy {:?} yielded nothing for '{}', falling back", strategy, schema.name);
        }

        Ok(Vec::new())
    }

    async fn run_strategy(&self, schema: &CollectionSchema, strategy: FetchStrategy) -> Result<Vec<Entry>, StoreError> {
        match strategy {
            FetchStrategy::Live => {
                let query = EntryQuery::new()
                    .publication(PublicationFilter::Live)
                    .populate_links();
                let response = self.store.find_entries(&schema.name, &query).await?;
                Ok(response.normalize())
            }
            FetchStrategy::PublishedFilter => {
                let query = EntryQuery::new()
                    .publication(PublicationFilter::PublishedNotNull)
                    .populate_links();
                let response = self.store.find_entries(&schema.name, &query).await?;
                Ok(response.normalize())
            }
            FetchStrategy::FetchAll => {
                let query = EntryQuery::new().populate_links();
                let response = self.store.find_entries(&schema.name, &query).await?;
                Ok(response.normalize().into_iter()
                    .filter(Entry::is_published)
                    .collect())
            }
            FetchStrategy::RawQuery => {
                let entries = self.store.query_raw(&schema.name).await?;
                Ok(entries.into_iter()
                    .filter(Entry::is_published)
                    .collect())
            }
        }
    }
}
