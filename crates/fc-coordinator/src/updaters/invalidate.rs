//! Collection invalidation and entity eviction

use fc_store::{fields_named, Cache, EntityKey, EntityRef};

/// Drop every cached page of root field `field_name`, whatever its arguments
///
/// Returns number of field keys dropped.
pub fn invalidate_collection(cache: &mut dyn Cache, field_name: &str) -> usize {
    let root = EntityKey::root();
    let recorded = fields_named(&*cache, &root, field_name);
    for info in &recorded {
        cache.invalidate_field(&root, &info.field_name, &info.arguments);
    }
    tracing::debug!(field = field_name, dropped = recorded.len(), "collection invalidated");
    recorded.len()
}

/// Evict entity `typename:id`
pub fn evict(cache: &mut dyn Cache, typename: &str, id: i64) {
    cache.invalidate_entity(&EntityRef::new(typename, id));
    tracing::debug!(typename, id, "entity evicted");
}
