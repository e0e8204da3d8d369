//! Cache primitive boundary
//!
//! Provides the [`Cache`] trait through which resolvers and mutation updaters
//! reach the normalized store, together with the shapes they pass across it.

use crate::error::StoreResult;
use crate::key::{Arguments, EntityKey, EntityRef, FieldKey};
use crate::value::FieldValue;
use serde_json::{Map, Value};

/// One recorded field of a record, as reported by [`Cache::inspect_fields`]
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    /// Field name without arguments
    pub field_name: String,
    /// Full field key
    pub field_key: FieldKey,
    /// Arguments the field was recorded with
    pub arguments: Arguments,
}

impl FieldInfo {
    /// Create info for a field key
    #[inline]
    #[must_use]
    pub fn from_key(field_key: &FieldKey) -> Self {
        Self {
            field_name: field_key.field_name().to_string(),
            field_key: field_key.clone(),
            arguments: field_key.arguments().clone(),
        }
    }
}

/// Static shape of a fragment on one entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Entity typename the fragment applies to
    pub typename: &'static str,
    /// Scalar fields selected by the fragment
    pub fields: &'static [&'static str],
}

impl Fragment {
    /// Create fragment shape
    #[inline]
    #[must_use]
    pub const fn new(typename: &'static str, fields: &'static [&'static str]) -> Self {
        Self { typename, fields }
    }
}

/// Field values read from or written through a [`Fragment`]
pub type FragmentData = Map<String, Value>;

/// Root field selected by a [`QueryDocument`]
#[derive(Debug, Clone, PartialEq)]
pub struct RootField {
    /// Field name, also the response key
    pub name: String,
    /// Arguments the field is invoked with
    pub arguments: Arguments,
}

impl RootField {
    /// Root field without arguments
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Arguments::new(),
        }
    }

    /// Set arguments
    #[inline]
    #[must_use]
    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Field key this root field is stored under
    #[inline]
    #[must_use]
    pub fn field_key(&self) -> FieldKey {
        FieldKey::new(self.name.clone(), self.arguments.clone())
    }
}

/// Fixed query shape used for whole-result reads and writes
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    name: String,
    fields: Vec<RootField>,
}

impl QueryDocument {
    /// Create document from operation name and root fields
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<RootField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Operation name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Selected root fields
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[RootField] {
        &self.fields
    }
}

/// Primitive operations on a normalized cache
///
/// Resolvers receive `&dyn Cache` and cannot write; updaters receive
/// `&mut dyn Cache`. Absence is never an error: reads return `None`, and
/// invalidating something that is not there is a no-op.
pub trait Cache {
    /// Every field recorded on `entity`, in recording order
    fn inspect_fields(&self, entity: &EntityKey) -> Vec<FieldInfo>;

    /// Value recorded under `field_key` on `entity`
    fn resolve(&self, entity: &EntityKey, field_key: &FieldKey) -> Option<FieldValue>;

    /// Drop the field recorded for `field_name` with exactly `arguments`
    fn invalidate_field(&mut self, entity: &EntityKey, field_name: &str, arguments: &Arguments);

    /// Evict an entity entirely
    fn invalidate_entity(&mut self, entity: &EntityRef);

    /// Read fragment fields of entity `id`
    ///
    /// `None` when the entity is not cached; otherwise only the selected
    /// fields that are present.
    fn read_fragment(&self, fragment: &Fragment, id: &str) -> Option<FragmentData>;

    /// Write selected fields from `values` onto entity `id`
    fn write_fragment(&mut self, fragment: &Fragment, id: &str, values: &FragmentData);

    /// Rebuild the cached result of `document`; `None` on a miss
    fn read_query(&self, document: &QueryDocument) -> Option<Value>;

    /// Normalize `data` as the result of `document`
    ///
    /// # Errors
    /// Returns error if `data` cannot be normalized
    fn write_query(&mut self, document: &QueryDocument, data: &Value) -> StoreResult<()>;
}

/// Recorded fields of `entity` named `field_name`, in recording order
#[must_use]
pub fn fields_named(cache: &dyn Cache, entity: &EntityKey, field_name: &str) -> Vec<FieldInfo> {
    cache
        .inspect_fields(entity)
        .into_iter()
        .filter(|info| info.field_name == field_name)
        .collect()
}
