//! Error types for the cache coordinator
//!
//! Provides error handling for:
//! - Mutation argument validation
//! - Client configuration
//! - Writing responses into the store
//!
//! Updaters never return errors. A mutation whose arguments fail validation
//! is skipped, and the reason is reported through `UpdateOutcome`.

use crate::mutation::MutationName;
use fc_store::StoreError;

/// Errors while narrowing mutation names and arguments
#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    /// Mutation name has no handler
    #[error("unknown mutation: '{0}'")]
    UnknownMutation(String),

    /// Vote value outside the two supported directions
    #[error("invalid vote value: {0} (expected 1 or -1)")]
    InvalidVoteValue(i64),

    /// Variables do not match the mutation's argument shape
    #[error("invalid arguments for {mutation}: {source}")]
    Invalid {
        mutation: MutationName,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors in client configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// API url environment variable not set
    #[error("environment variable {var} is not set")]
    MissingApiUrl { var: &'static str },

    /// API url is not an http(s) url
    #[error("invalid api url: '{0}'")]
    InvalidApiUrl(String),

    /// Two pagination configs for the same field
    #[error("field '{0}' has more than one pagination config")]
    DuplicatePaginatedField(String),
}

/// Combined client error
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
