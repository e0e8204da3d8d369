//! FC Coordinator - forum client cache coordination
//!
//! Keeps a normalized client cache consistent with a forum GraphQL API:
//! - Merges every cached page of a paginated list into one result
//! - Patches vote tallies optimistically
//! - Invalidates lists after creates and evicts entities after deletes
//! - Keeps the `me` session snapshot in sync with login, logout and register
//!
//! # Example
//!
//! ```rust
//! use fc_coordinator::prelude::*;
//! use serde_json::json;
//!
//! let mut client = create_client(&ClientConfig::default(), &RenderContext::Browser).unwrap();
//!
//! let page = json!({"posts": {
//!     "__typename": "PaginatedPosts",
//!     "hasMore": false,
//!     "posts": [{"__typename": "Post", "id": 1, "points": 4, "voteStatus": null}]
//! }});
//! client.write_result(&documents::posts(10, None), &page).unwrap();
//!
//! let outcome = client
//!     .apply_mutation("vote", &json!({"postId": 1, "value": 1}), &json!({"vote": true}));
//! assert_eq!(outcome, UpdateOutcome::Applied);
//!
//! let read = client.read(&documents::posts(10, None));
//! assert_eq!(read.data().unwrap()["posts"]["posts"][0]["points"], json!(5));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod mutation;
pub mod pagination;
pub mod updaters;

// Re-exports for convenience
pub use client::{create_client, Client, QueryRead};
pub use config::{ClientConfig, Credentials, FetchOptions, RenderContext, API_URL_ENV};
pub use error::{ArgsError, ClientError, ClientResult, ConfigError};
pub use mutation::{Mutation, MutationName, VoteValue};
pub use pagination::{CursorPagination, MergeMode, PaginatedResult, PaginationConfig, Resolution};
pub use updaters::{apply_updates, update_query, SkipReason, UpdateOutcome};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the coordinator
    pub use crate::documents;
    pub use crate::{
        create_client, Client, ClientConfig, MutationName, PaginationConfig, QueryRead,
        RenderContext, UpdateOutcome,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
