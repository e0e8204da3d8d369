//! Mutation cache updaters
//!
//! After a mutation's payload has been normalized, its updater patches the
//! rest of the cache so views reflect the change without a refetch:
//!
//! - `vote` / `voteReply`: optimistic point arithmetic on the cached fragment
//! - `createPost` / `createReply`: invalidate every cached page of the list
//! - `deletePost` / `deleteReply`: evict the entity
//! - `login` / `logout` / `register`: rewrite the session snapshot
//!
//! Updaters never fail. When there is nothing sensible to patch they report
//! [`UpdateOutcome::Skipped`] and leave the cache as it was.

pub mod invalidate;
pub mod session;
pub mod vote;

use crate::documents::{POSTS_FIELD, POST_TYPENAME, REPLIES_FIELD, REPLY_TYPENAME};
use crate::mutation::Mutation;
use fc_store::Cache;
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

pub use invalidate::{evict, invalidate_collection};
pub use session::{update_query, FieldError, MeQuery, UserId, UserResponse, UserSummary};
pub use vote::{update_vote, VoteTally, VoteTarget};

/// What an updater did to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Cache patched
    Applied,
    /// Nothing patched
    Skipped(SkipReason),
    /// Mutation has no cache policy
    PassThrough,
}

impl UpdateOutcome {
    /// Whether the cache was patched
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl Display for UpdateOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => f.write_str("applied"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
            Self::PassThrough => f.write_str("pass-through"),
        }
    }
}

/// Why an updater left the cache untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Target entity is not cached
    NotCached,
    /// Cached fragment lacks a readable field
    IncompleteFragment,
    /// Server reported errors
    ResultErrors,
    /// Mutation payload has an unexpected shape
    MalformedResult,
    /// Mutation variables failed validation
    InvalidArguments,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotCached => "target not cached",
            Self::IncompleteFragment => "cached fragment incomplete",
            Self::ResultErrors => "result has errors",
            Self::MalformedResult => "malformed result",
            Self::InvalidArguments => "invalid arguments",
        };
        f.write_str(reason)
    }
}

/// Run the updater for `mutation` against `cache`
///
/// `result` is the mutation's `data` object as returned by the server.
pub fn apply_updates(mutation: &Mutation, result: &Value, cache: &mut dyn Cache) -> UpdateOutcome {
    let outcome = match mutation {
        Mutation::Vote(args) => update_vote(cache, VoteTarget::Post, args.post_id, args.value),
        Mutation::VoteReply(args) => {
            update_vote(cache, VoteTarget::Reply, args.reply_id, args.value)
        }
        Mutation::CreatePost(_) => {
            invalidate_collection(cache, POSTS_FIELD);
            UpdateOutcome::Applied
        }
        Mutation::CreateReply(_) => {
            invalidate_collection(cache, REPLIES_FIELD);
            UpdateOutcome::Applied
        }
        Mutation::DeletePost(args) => {
            evict(cache, POST_TYPENAME, args.id);
            UpdateOutcome::Applied
        }
        Mutation::DeleteReply(args) => {
            evict(cache, REPLY_TYPENAME, args.id);
            UpdateOutcome::Applied
        }
        Mutation::Login(_) => session::login(cache, result),
        Mutation::Logout => session::logout(cache),
        Mutation::Register(_) => session::register(cache, result),
        Mutation::Ignored(_) => UpdateOutcome::PassThrough,
    };

    tracing::debug!(mutation = %mutation.name(), ?outcome, "cache updater finished");
    outcome
}
