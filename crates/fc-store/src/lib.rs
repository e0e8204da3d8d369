//! FC Normalized Store
//!
//! Entity-normalized cache for GraphQL-shaped responses.
//!
//! # Overview
//!
//! - **EntityKey / FieldKey**: identities of records and of field invocations
//! - **Arguments**: field arguments with canonical (order-independent) printing
//! - **Cache**: the primitive boundary used by resolvers and updaters
//! - **NormalizedCache**: insertion-ordered in-memory implementation
//!
//! # Example
//!
//! ```rust
//! use fc_store::{Arguments, Cache, EntityKey, NormalizedCache, QueryDocument, RootField};
//! use serde_json::json;
//!
//! let mut cache = NormalizedCache::new();
//! let document = QueryDocument::new(
//!     "Post",
//!     vec![RootField::new("post").with_arguments(Arguments::new().with("id", 1))],
//! );
//!
//! cache
//!     .write_query(&document, &json!({"post": {"__typename": "Post", "id": 1, "points": 3}}))
//!     .unwrap();
//!
//! assert!(cache.contains(&EntityKey::entity("Post", "1")));
//! assert_eq!(cache.read_query(&document).unwrap()["post"]["points"], json!(3));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
pub mod key;
pub mod store;
pub mod value;

// Re-exports
pub use cache::{fields_named, Cache, FieldInfo, Fragment, FragmentData, QueryDocument, RootField};
pub use error::{StoreError, StoreResult};
pub use key::{id_to_string, Arguments, EntityKey, EntityRef, FieldKey, ROOT_QUERY};
pub use store::{CacheStats, KeyingConfig, NormalizedCache};
pub use value::{FieldValue, Link};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
