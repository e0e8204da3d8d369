//! In-memory normalized cache
//!
//! Provides [`NormalizedCache`], the default [`Cache`] implementation.
//!
//! Records are kept in insertion order. Rewriting an existing field keeps its
//! position, and removing a field or record keeps the order of the rest, so
//! pages of a collection are always reported in the order they were first
//! recorded.

use crate::cache::{Cache, FieldInfo, Fragment, FragmentData, QueryDocument};
use crate::error::{StoreError, StoreResult};
use crate::key::{id_to_string, Arguments, EntityKey, EntityRef, FieldKey};
use crate::value::{FieldValue, Link};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

const TYPENAME: &str = "__typename";
const ID: &str = "id";

/// Which typenames are stored as entities
///
/// An object is an entity when it carries `__typename` and a scalar `id`
/// and its typename is not marked unkeyed. Everything else is embedded under
/// the field that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyingConfig {
    unkeyed: BTreeSet<String>,
}

impl KeyingConfig {
    /// Config where every identified object is an entity
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Never key objects of `typename`
    #[inline]
    #[must_use]
    pub fn with_unkeyed(mut self, typename: impl Into<String>) -> Self {
        self.unkeyed.insert(typename.into());
        self
    }

    /// Whether `typename` is stored embedded
    #[inline]
    #[must_use]
    pub fn is_unkeyed(&self, typename: &str) -> bool {
        self.unkeyed.contains(typename)
    }

    /// Entity identity of a response object, if it has one
    #[must_use]
    pub fn identify(&self, object: &Map<String, Value>) -> Option<EntityRef> {
        let typename = object.get(TYPENAME)?.as_str()?;
        if self.is_unkeyed(typename) {
            return None;
        }
        let id = object.get(ID).and_then(id_to_string)?;
        Some(EntityRef::new(typename, id))
    }
}

/// Statistics for cache inspection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of records, root included
    pub record_count: usize,
    /// Number of recorded fields across all records
    pub field_count: usize,
}

type Record = IndexMap<FieldKey, FieldValue>;

/// Normalized cache of entity and embedded records
#[derive(Debug, Clone, Default)]
pub struct NormalizedCache {
    records: IndexMap<EntityKey, Record>,
    keying: KeyingConfig,
}

impl NormalizedCache {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty cache with keying rules
    #[inline]
    #[must_use]
    pub fn with_keying(keying: KeyingConfig) -> Self {
        Self {
            records: IndexMap::new(),
            keying,
        }
    }

    /// Keying rules in use
    #[inline]
    #[must_use]
    pub fn keying(&self) -> &KeyingConfig {
        &self.keying
    }

    /// Whether a record exists under `key`
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.records.contains_key(key)
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if cache holds no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            record_count: self.records.len(),
            field_count: self.records.values().map(IndexMap::len).sum(),
        }
    }

    /// Record `value` under `field_key` on `entity`
    pub fn write_field(&mut self, entity: &EntityKey, field_key: FieldKey, value: FieldValue) {
        self.records
            .entry(entity.clone())
            .or_default()
            .insert(field_key, value);
    }

    /// Normalize every identified entity found anywhere in `data`
    ///
    /// Used for mutation payloads: entities are updated in place, nothing is
    /// linked from the root.
    ///
    /// # Errors
    /// Returns error if an entity contains an object that cannot be normalized
    pub fn write_entities(&mut self, data: &Value) -> StoreResult<()> {
        match data {
            Value::Object(object) => {
                if let Some(entity) = self.keying.identify(object) {
                    return self.normalize_object(&EntityKey::from(&entity), object);
                }
                for value in object.values() {
                    self.write_entities(value)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                for item in items {
                    self.write_entities(item)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Rebuild the JSON of one field
    #[must_use]
    pub fn read_field(&self, entity: &EntityKey, field_key: &FieldKey) -> Option<Value> {
        let value = self.records.get(entity)?.get(field_key)?;
        Some(self.field_to_json(value, &mut Vec::new()))
    }

    /// Rebuild the JSON of one record
    #[must_use]
    pub fn read_entity(&self, key: &EntityKey) -> Option<Value> {
        self.record_to_json(key, &mut Vec::new())
    }

    /// Remove every record not reachable from the root
    ///
    /// Returns number of records removed.
    pub fn collect_garbage(&mut self) -> usize {
        let mut reachable: HashSet<EntityKey> = HashSet::new();
        let mut pending = vec![EntityKey::root()];

        while let Some(key) = pending.pop() {
            if !reachable.insert(key.clone()) {
                continue;
            }
            if let Some(record) = self.records.get(&key) {
                for value in record.values() {
                    if let FieldValue::Link(link) = value {
                        pending.extend(link.keys().cloned());
                    }
                }
            }
        }

        let before = self.records.len();
        self.records.retain(|key, _| reachable.contains(key));
        let removed = before - self.records.len();
        if removed > 0 {
            tracing::debug!(removed, "collected unreachable records");
        }
        removed
    }

    fn normalize_object(&mut self, key: &EntityKey, object: &Map<String, Value>) -> StoreResult<()> {
        for (name, value) in object {
            let field_key = FieldKey::plain(name.clone());
            let stored = self.normalize_value(key, &field_key, value)?;
            self.write_field(key, field_key, stored);
        }
        Ok(())
    }

    fn normalize_value(
        &mut self,
        parent: &EntityKey,
        field_key: &FieldKey,
        value: &Value,
    ) -> StoreResult<FieldValue> {
        match value {
            Value::Object(object) => {
                let key = self.record_key(object, EntityKey::embedded(parent, field_key))?;
                self.normalize_object(&key, object)?;
                Ok(FieldValue::Link(Link::Single(key)))
            }
            Value::Array(items) if items.iter().any(Value::is_object) => {
                let mut links = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Value::Object(object) => {
                            let embedded = EntityKey::embedded_item(parent, field_key, index);
                            let key = self.record_key(object, embedded)?;
                            self.normalize_object(&key, object)?;
                            links.push(Some(key));
                        }
                        Value::Null => links.push(None),
                        _ => {
                            return Err(StoreError::MixedList {
                                path: format!("{parent}.{field_key}"),
                            })
                        }
                    }
                }
                Ok(FieldValue::Link(Link::List(links)))
            }
            other => Ok(FieldValue::Scalar(other.clone())),
        }
    }

    fn record_key(&self, object: &Map<String, Value>, embedded: EntityKey) -> StoreResult<EntityKey> {
        let Some(typename) = object.get(TYPENAME).and_then(Value::as_str) else {
            return Err(StoreError::MissingTypename {
                path: embedded.to_string(),
            });
        };
        if let Some(entity) = self.keying.identify(object) {
            return Ok(EntityKey::from(&entity));
        }
        if !self.keying.is_unkeyed(typename) {
            tracing::debug!(typename, key = %embedded, "object without id stored embedded");
        }
        Ok(embedded)
    }

    fn record_to_json(&self, key: &EntityKey, path: &mut Vec<EntityKey>) -> Option<Value> {
        let record = self.records.get(key)?;

        // Already being expanded further up: emit identity only
        if path.contains(key) {
            let mut stub = Map::new();
            for name in [TYPENAME, ID] {
                if let Some(FieldValue::Scalar(value)) = record.get(&FieldKey::plain(name)) {
                    stub.insert(name.to_string(), value.clone());
                }
            }
            return Some(Value::Object(stub));
        }

        path.push(key.clone());
        let mut object = Map::new();
        for (field_key, value) in record {
            object.insert(
                field_key.field_name().to_string(),
                self.field_to_json(value, path),
            );
        }
        path.pop();
        Some(Value::Object(object))
    }

    fn field_to_json(&self, value: &FieldValue, path: &mut Vec<EntityKey>) -> Value {
        match value {
            FieldValue::Scalar(scalar) => scalar.clone(),
            FieldValue::Link(Link::Single(key)) => {
                self.record_to_json(key, path).unwrap_or(Value::Null)
            }
            FieldValue::Link(Link::List(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        // evicted entities drop out of lists
                        Some(key) => out.extend(self.record_to_json(key, path)),
                        None => out.push(Value::Null),
                    }
                }
                Value::Array(out)
            }
        }
    }
}

impl Cache for NormalizedCache {
    fn inspect_fields(&self, entity: &EntityKey) -> Vec<FieldInfo> {
        self.records
            .get(entity)
            .map(|record| record.keys().map(FieldInfo::from_key).collect())
            .unwrap_or_default()
    }

    fn resolve(&self, entity: &EntityKey, field_key: &FieldKey) -> Option<FieldValue> {
        self.records.get(entity)?.get(field_key).cloned()
    }

    fn invalidate_field(&mut self, entity: &EntityKey, field_name: &str, arguments: &Arguments) {
        let field_key = FieldKey::new(field_name, arguments.clone());
        if let Some(record) = self.records.get_mut(entity) {
            if record.shift_remove(&field_key).is_some() {
                tracing::trace!(entity = %entity, field = %field_key, "field invalidated");
            }
        }
    }

    fn invalidate_entity(&mut self, entity: &EntityRef) {
        let key = EntityKey::from(entity);
        if self.records.shift_remove(&key).is_some() {
            tracing::trace!(entity = %key, "entity evicted");
        }
    }

    fn read_fragment(&self, fragment: &Fragment, id: &str) -> Option<FragmentData> {
        let record = self.records.get(&EntityKey::entity(fragment.typename, id))?;
        let mut data = FragmentData::new();
        for &field in fragment.fields {
            if let Some(FieldValue::Scalar(value)) = record.get(&FieldKey::plain(field)) {
                data.insert(field.to_string(), value.clone());
            }
        }
        Some(data)
    }

    fn write_fragment(&mut self, fragment: &Fragment, id: &str, values: &FragmentData) {
        let record = self
            .records
            .entry(EntityKey::entity(fragment.typename, id))
            .or_default();

        if record.is_empty() {
            record.insert(
                FieldKey::plain(TYPENAME),
                FieldValue::Scalar(Value::String(fragment.typename.to_string())),
            );
            let id_value = values
                .get(ID)
                .cloned()
                .unwrap_or_else(|| Value::String(id.to_string()));
            record.insert(FieldKey::plain(ID), FieldValue::Scalar(id_value));
        }

        for &field in fragment.fields {
            if field == TYPENAME || field == ID {
                continue;
            }
            if let Some(value) = values.get(field) {
                record.insert(FieldKey::plain(field), FieldValue::Scalar(value.clone()));
            }
        }
    }

    fn read_query(&self, document: &QueryDocument) -> Option<Value> {
        let root = EntityKey::root();
        let mut data = Map::new();
        for field in document.fields() {
            let value = self.read_field(&root, &field.field_key())?;
            data.insert(field.name.clone(), value);
        }
        Some(Value::Object(data))
    }

    fn write_query(&mut self, document: &QueryDocument, data: &Value) -> StoreResult<()> {
        let Value::Object(object) = data else {
            return Err(StoreError::NotAnObject {
                document: document.name().to_string(),
            });
        };

        let root = EntityKey::root();
        for field in document.fields() {
            let value = object
                .get(&field.name)
                .ok_or_else(|| StoreError::missing_root_field(document.name(), &field.name))?;
            let field_key = field.field_key();
            let stored = self.normalize_value(&root, &field_key, value)?;
            self.write_field(&root, field_key, stored);
        }

        tracing::trace!(document = document.name(), "query result written");
        Ok(())
    }
}
