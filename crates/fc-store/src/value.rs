//! Stored field values

use crate::key::EntityKey;
use serde_json::Value;

/// Reference from a field to other records
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    /// One record
    Single(EntityKey),
    /// List of records; `None` for `null` list items
    List(Vec<Option<EntityKey>>),
}

impl Link {
    /// Iterate every key referenced by this link
    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        let (single, list): (Option<&EntityKey>, &[Option<EntityKey>]) = match self {
            Self::Single(key) => (Some(key), &[]),
            Self::List(items) => (None, items.as_slice()),
        };
        single.into_iter().chain(list.iter().flatten())
    }
}

/// Value recorded under a field key
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Plain JSON data (numbers, strings, scalar lists, `null`)
    Scalar(Value),
    /// Link to normalized records
    Link(Link),
}

impl FieldValue {
    /// Scalar payload, if any
    #[inline]
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Link(_) => None,
        }
    }

    /// Link payload, if any
    #[inline]
    #[must_use]
    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Self::Link(link) => Some(link),
            Self::Scalar(_) => None,
        }
    }

    /// Key of a single linked record
    #[inline]
    #[must_use]
    pub fn as_entity(&self) -> Option<&EntityKey> {
        match self {
            Self::Link(Link::Single(key)) => Some(key),
            _ => None,
        }
    }

    /// Items of a linked list
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Option<EntityKey>]> {
        match self {
            Self::Link(Link::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Scalar boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    /// Scalar integer
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }
}
