use crate::store::model::CollectionSchema;

/// Select the attributes of a schema whose values are human-readable text.
///
/// Only short text, long text and rich text attributes qualify. Selection
/// is schema-driven at the top level; whether a selected value is a plain
/// string or a nested structured-text object is decided per value by the
/// translation service. Arrays are never expanded into translatable leaves.
pub fn translatable_fields(schema: &CollectionSchema) -> Vec<String> {
    schema.attributes.iter()
        .filter(|(_, kind)| kind.is_translatable())
        .map(|(name, _)| name.clone())
        .collect()
}
