use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, TranslationProviderKind};
use crate::locale_utils;
use crate::providers::TranslationProvider;
use crate::providers::deepl::DeepL;
use crate::providers::google::Google;
use crate::providers::mock::MockProvider;
use crate::replication::{LinkRepairer, ReplicationEngine};
use crate::store::http::HttpStore;
use crate::store::{ContentStore, EntryId, LocaleRegistry};
use crate::translation::TranslationService;

// Application controller wiring configuration into the replication engine

/// Main application controller for locale replication workflows
pub struct Controller {
    /// App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.translation.provider = TranslationProviderKind::Mock;
        Self::with_config(config)
    }

    /// Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_locale.is_empty() && !self.config.store.endpoint.is_empty()
    }

    fn build_provider(&self) -> Result<Arc<dyn TranslationProvider>> {
        let translation = &self.config.translation;
        let retry_count = translation.common.retry_count;
        let retry_backoff_ms = translation.common.retry_backoff_ms;

        let provider: Arc<dyn TranslationProvider> = match translation.provider {
            TranslationProviderKind::Google => Arc::new(Google::new_with_config(
                translation.get_api_key(),
                translation.get_endpoint(),
                retry_count,
                retry_backoff_ms,
                translation.get_rate_limit(),
            )),
            TranslationProviderKind::DeepL => Arc::new(DeepL::new_with_config(
                translation.get_api_key(),
                translation.get_endpoint(),
                retry_count,
                retry_backoff_ms,
            )),
            TranslationProviderKind::Mock => Arc::new(MockProvider::working()),
        };
        Ok(provider)
    }

    fn build_store(&self) -> Arc<HttpStore> {
        let store = &self.config.store;
        Arc::new(HttpStore::new_with_config(
            store.endpoint.clone(),
            store.api_token.clone(),
            store.retry_count,
            store.retry_backoff_ms,
            store.timeout_secs,
        ))
    }

    fn build_engine(&self) -> Result<ReplicationEngine> {
        let store = self.build_store();
        let provider = self.build_provider()?;
        let translator = TranslationService::new(provider);

        let content_store: Arc<dyn ContentStore> = store.clone();
        let registry: Arc<dyn LocaleRegistry> = store;
        Ok(ReplicationEngine::new(content_store, registry, translator))
    }

    /// Replicate all published content into each of the given target
    /// locales, or into every configured target when none is given.
    pub async fn run_replicate(&self, target: Option<String>) -> Result<()> {
        let targets: Vec<String> = match target {
            Some(locale) => vec![locale],
            None => self.config.target_locales.clone(),
        };
        if targets.is_empty() {
            return Err(anyhow!("No target locales given and none configured"));
        }

        let engine = self.build_engine()?;
        let source = &self.config.source_locale;

        let progress = ProgressBar::new(targets.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        progress.enable_steady_tick(Duration::from_millis(120));

        let mut had_failures = false;
        for target in &targets {
            progress.set_message(format!("replicating to '{}'", target));

            let report = engine.replicate_all(target, source).await
                .with_context(|| format!("Replication to '{}' failed", target))?;

            progress.println(format!("[{}] {}", target, report));
            for failure in &report.errors {
                progress.println(format!(
                    "  error: {} entry {}: {}",
                    failure.collection, failure.entry_id, failure.error
                ));
            }
            had_failures |= report.failed > 0;
            progress.inc(1);
        }
        progress.finish_with_message("done");

        if had_failures {
            warn!("Replication finished with per-entry failures, see the list above");
        }
        Ok(())
    }

    /// Translate one entry and print the translated copy without writing
    /// anything back to the store.
    pub async fn run_translate_entry(&self, collection: &str, id: EntryId, target: &str) -> Result<()> {
        let engine = self.build_engine()?;
        let entry = engine
            .translate_single_entry(collection, id, target, &self.config.source_locale)
            .await?;

        println!("{}", serde_json::to_string_pretty(&entry.to_value())?);
        Ok(())
    }

    /// Translate a batch of raw strings and print one per line
    pub async fn run_texts(&self, texts: &[String], target: &str) -> Result<()> {
        let provider = self.build_provider()?;
        let translator = TranslationService::new(provider);

        let translated = translator
            .translate_texts(texts, &self.config.source_locale, target)
            .await;
        for line in translated {
            println!("{}", line);
        }
        Ok(())
    }

    /// Repair one entry's link set, or every entry of a collection
    pub async fn run_repair(&self, collection: &str, id: Option<EntryId>) -> Result<()> {
        let store = self.build_store();
        let repairer = LinkRepairer::new(store.as_ref());

        match id {
            Some(entry_id) => {
                let outcome = repairer.repair_entry(collection, entry_id).await?;
                if !outcome.found {
                    println!("{} entry {}: not found, nothing to repair", collection, entry_id);
                } else {
                    println!(
                        "{} entry {}: removed {} self-reference(s), {} dangling link(s)",
                        collection, entry_id,
                        outcome.self_references_removed, outcome.dangling_removed
                    );
                    for warning in &outcome.warnings {
                        println!("  warning: {}", warning);
                    }
                }
            }
            None => {
                let outcomes = repairer.repair_collection(collection).await?;
                let repaired = outcomes.iter()
                    .filter(|(_, o)| o.self_references_removed + o.dangling_removed > 0)
                    .count();
                println!("{}: inspected {} entries, repaired {}", collection, outcomes.len(), repaired);
            }
        }
        Ok(())
    }

    /// Report entries missing a document identity, per collection
    pub async fn run_audit(&self) -> Result<()> {
        let store = self.build_store();
        let repairer = LinkRepairer::new(store.as_ref());

        let collections = store.collections().await?;
        let mut total_missing = 0;
        for collection in &collections {
            let audit = repairer.audit_collection(collection).await?;
            if audit.missing.is_empty() {
                println!("{}: {} entries, all carry documentIds", audit.collection, audit.total);
            } else {
                println!(
                    "{}: {} of {} entries missing documentIds: {:?}",
                    audit.collection, audit.missing.len(), audit.total, audit.missing
                );
                total_missing += audit.missing.len();
            }
        }
        if total_missing > 0 {
            warn!("{} entries lack documentIds; locale variants cannot attach to them", total_missing);
        }
        Ok(())
    }

    /// List the languages the active provider supports
    pub async fn run_languages(&self) -> Result<()> {
        let provider = self.build_provider()?;
        let translator = TranslationService::new(provider);

        let languages = translator.supported_languages().await;
        if languages.is_empty() {
            println!("No languages reported (provider unreachable?)");
            return Ok(());
        }
        for language in languages {
            println!("{}\t{}", language.code, language.name);
        }
        Ok(())
    }

    /// List the store's configured locales, minus the source locale
    pub async fn run_locales(&self) -> Result<()> {
        let engine = self.build_engine()?;
        let locales = engine.available_locales(&self.config.source_locale).await?;

        if locales.is_empty() {
            println!("No replication targets configured in the store");
            return Ok(());
        }
        for locale in locales {
            let name = locale_utils::locale_display_name(&locale.code)
                .unwrap_or_else(|_| locale.name.clone());
            println!("{}\t{}", locale.code, name);
        }
        Ok(())
    }

    /// Print the redacted configuration
    pub fn run_show_config(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&self.config.safe_view())?);
        Ok(())
    }

    /// Verify the provider connection before a long run
    pub async fn check_provider(&self) -> Result<()> {
        let provider = self.build_provider()?;
        let translator = TranslationService::new(provider);
        translator.test_connection().await?;
        info!("Provider connection OK");
        Ok(())
    }
}
