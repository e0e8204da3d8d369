//! Entity and field identities
//!
//! Provides [`EntityKey`] for records, [`EntityRef`] for eviction targets,
//! [`Arguments`] with canonical serialization, and [`FieldKey`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Typename of the root query record
pub const ROOT_QUERY: &str = "Query";

/// Key of a record in the normalized cache
///
/// Three shapes exist:
/// - the root: `Query`
/// - identified entities: `Post:12`
/// - embedded (unkeyed) records: `Query.posts({"limit":10})`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Root query key
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_QUERY.to_string())
    }

    /// Key of an identified entity
    #[inline]
    #[must_use]
    pub fn entity(typename: &str, id: &str) -> Self {
        Self(format!("{typename}:{id}"))
    }

    /// Key of a record embedded under `parent` through `field`
    #[inline]
    #[must_use]
    pub fn embedded(parent: &EntityKey, field: &FieldKey) -> Self {
        Self(format!("{parent}.{field}"))
    }

    /// Key of the `index`-th record of an embedded list
    #[inline]
    #[must_use]
    pub fn embedded_item(parent: &EntityKey, field: &FieldKey, index: usize) -> Self {
        Self(format!("{parent}.{field}.{index}"))
    }

    /// Printed key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the root query key
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_QUERY
    }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&EntityRef> for EntityKey {
    fn from(entity: &EntityRef) -> Self {
        Self::entity(&entity.typename, &entity.id)
    }
}

/// Typename and id of an identified entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// GraphQL `__typename`
    pub typename: String,
    /// Entity id, printed
    pub id: String,
}

impl EntityRef {
    /// Create reference from typename and any printable id
    #[inline]
    #[must_use]
    pub fn new(typename: impl Into<String>, id: impl Display) -> Self {
        Self {
            typename: typename.into(),
            id: id.to_string(),
        }
    }
}

/// Print a JSON id (string or number) the way it appears inside entity keys
#[must_use]
pub fn id_to_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Field arguments
///
/// Held sorted by name; [`Arguments::canonical`] also sorts nested object
/// keys, so the printed form does not depend on the caller's property order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(BTreeMap<String, Value>);

impl Arguments {
    /// Empty argument set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add an argument
    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Build from a JSON variables object; `null` yields an empty set
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::new()),
            Value::Object(map) => Some(Self(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            _ => None,
        }
    }

    /// Get argument value
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Number of arguments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no arguments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate arguments in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Canonical JSON with keys sorted at every depth
    #[must_use]
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        out.push('{');
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&Value::String(name.clone()).to_string());
            out.push(':');
            write_canonical(value, &mut out);
        }
        out.push('}');
        out
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(inner) = map.get(key) {
                    write_canonical(inner, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Identity of one field invocation on a record
///
/// Printed as `name` without arguments and `name({...})` with them.
/// Equality and hashing use the printed form only.
#[derive(Debug, Clone)]
pub struct FieldKey {
    field_name: String,
    arguments: Arguments,
    printed: String,
}

impl FieldKey {
    /// Field key with arguments
    #[must_use]
    pub fn new(field_name: impl Into<String>, arguments: Arguments) -> Self {
        let field_name = field_name.into();
        let printed = if arguments.is_empty() {
            field_name.clone()
        } else {
            format!("{field_name}({})", arguments.canonical())
        };
        Self {
            field_name,
            arguments,
            printed,
        }
    }

    /// Field key without arguments
    #[inline]
    #[must_use]
    pub fn plain(field_name: impl Into<String>) -> Self {
        Self::new(field_name, Arguments::new())
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Arguments the field was invoked with
    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Printed key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.printed
    }
}

impl PartialEq for FieldKey {
    fn eq(&self, other: &Self) -> bool {
        self.printed == other.printed
    }
}

impl Eq for FieldKey {}

impl Hash for FieldKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.printed.hash(state);
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.printed)
    }
}
