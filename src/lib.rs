/*!
 * # locweave - locale replication for headless content stores
 *
 * A Rust library for replicating published content entries across locales
 * using machine translation.
 *
 * ## Features
 *
 * - Discover published entries across all collections of a content store,
 *   tolerating the store's inconsistent fetch behavior and response shapes
 * - Translate text fields using external providers:
 *   - Google Cloud Translation v2
 *   - DeepL API v2
 * - Create locale variant records that stay linked to their source through
 *   a stable document identity (or, for legacy stores, a symmetric link list)
 * - Idempotent batch runs: existing variants are skipped, never duplicated
 * - Repair broken cross-locale links (self-references, dangling references)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `store`: Content store access:
 *   - `store::model`: Entry and schema model, publication predicate
 *   - `store::response`: Response-shape normalization
 *   - `store::http`: REST store client
 *   - `store::memory`: In-process store for tests and dry runs
 * - `translation`: Translation of content fields:
 *   - `translation::fields`: Translatable-field selection
 *   - `translation::service`: Fail-open translation service
 *   - `translation::cache`: Caching of provider responses
 * - `replication`: The replication engine core:
 *   - `replication::discovery`: Eligible-entry discovery
 *   - `replication::orchestrator`: The top-level replication loop
 *   - `replication::writer`: Variant creation per identity scheme
 *   - `replication::repair`: Cross-locale link repair
 * - `providers`: Client implementations for translation providers:
 *   - `providers::google`: Google Cloud Translation client
 *   - `providers::deepl`: DeepL client
 *   - `providers::mock`: Scripted provider for tests
 * - `app_controller`: Main application controller
 * - `locale_utils`: ISO locale code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod locale_utils;
pub mod providers;
pub mod replication;
pub mod store;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, ReplicationError, StoreError};
pub use replication::{ReplicationEngine, ReplicationReport};
pub use store::{CollectionSchema, ContentStore, Entry, LocaleRegistry};
pub use translation::TranslationService;
