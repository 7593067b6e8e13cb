/*!
 * Translation of content fields.
 *
 * The translation module contains:
 * - `translation::fields`: selection of translatable attributes from a schema
 * - `translation::service`: the translation service (fail-open per string)
 * - `translation::cache`: in-memory caching of provider responses
 */

pub mod fields;
pub mod service;
pub mod cache;

pub use fields::translatable_fields;
pub use service::TranslationService;
pub use cache::TranslationCache;
