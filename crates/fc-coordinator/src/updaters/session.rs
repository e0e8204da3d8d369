//! Session snapshot sync
//!
//! `login`, `logout` and `register` rewrite the cached result of the `me`
//! query through [`update_query`], a read-modify-write transaction over one
//! query document with typed old and new values.

use super::invalidate::invalidate_collection;
use super::{SkipReason, UpdateOutcome};
use crate::documents::{self, POSTS_FIELD, REPLIES_FIELD, USER_TYPENAME};
use fc_store::{Cache, QueryDocument};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn user_typename() -> String {
    USER_TYPENAME.to_string()
}

/// GraphQL `ID` of a user, sent as a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Str(String),
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// Logged-in user as cached under `me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "__typename", default = "user_typename")]
    pub typename: String,
    pub id: UserId,
    pub username: String,
}

impl UserSummary {
    /// Create user summary
    #[must_use]
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            typename: user_typename(),
            id: UserId::Int(id),
            username: username.into(),
        }
    }

    /// Replace the id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<UserId>) -> Self {
        self.id = id.into();
        self
    }
}

/// Validation error reported by the server for one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// `UserResponse { errors user }` returned by login and register
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub errors: Option<Vec<FieldError>>,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

impl UserResponse {
    /// Whether the server reported at least one error
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }
}

/// Typed result of the `me` query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeQuery {
    pub me: Option<UserSummary>,
}

/// Read-modify-write the cached result of `document`
///
/// `update` receives the mutation result and the typed old value (`None` if
/// not cached or not readable as `Q`) and returns the new value, or `None` to
/// leave the cache unchanged. Returns whether a value was written.
pub fn update_query<R, Q, F>(
    cache: &mut dyn Cache,
    document: &QueryDocument,
    result: &R,
    update: F,
) -> bool
where
    Q: Serialize + DeserializeOwned,
    F: FnOnce(&R, Option<Q>) -> Option<Q>,
{
    let old = cache
        .read_query(document)
        .and_then(|data| serde_json::from_value::<Q>(data).ok());

    let Some(new) = update(result, old) else {
        return false;
    };

    let data = match serde_json::to_value(&new) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(document = document.name(), error = %e, "query value not serializable");
            return false;
        }
    };

    match cache.write_query(document, &data) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(document = document.name(), error = %e, "query write failed");
            false
        }
    }
}

/// `login`: set the session user and drop every cached page
pub fn login(cache: &mut dyn Cache, result: &Value) -> UpdateOutcome {
    let outcome = sign_in(cache, result, "login");
    if outcome.is_applied() {
        invalidate_collection(cache, POSTS_FIELD);
        invalidate_collection(cache, REPLIES_FIELD);
    }
    outcome
}

/// `register`: set the session user
pub fn register(cache: &mut dyn Cache, result: &Value) -> UpdateOutcome {
    sign_in(cache, result, "register")
}

/// `logout`: clear the session user
pub fn logout(cache: &mut dyn Cache) -> UpdateOutcome {
    let written = update_query(cache, &documents::me(), &(), |_, _old: Option<MeQuery>| {
        Some(MeQuery { me: None })
    });
    if !written {
        return UpdateOutcome::Skipped(SkipReason::MalformedResult);
    }
    tracing::info!("session cleared");
    UpdateOutcome::Applied
}

fn sign_in(cache: &mut dyn Cache, result: &Value, field: &str) -> UpdateOutcome {
    let Some(response) = result
        .get(field)
        .and_then(|payload| UserResponse::deserialize(payload).ok())
    else {
        tracing::warn!(mutation = field, "result is not a UserResponse");
        return UpdateOutcome::Skipped(SkipReason::MalformedResult);
    };

    if response.has_errors() {
        tracing::debug!(mutation = field, "server reported errors, session unchanged");
        return UpdateOutcome::Skipped(SkipReason::ResultErrors);
    }

    let written = update_query(cache, &documents::me(), &response, |response, _old: Option<MeQuery>| {
        Some(MeQuery {
            me: response.user.clone(),
        })
    });
    if !written {
        return UpdateOutcome::Skipped(SkipReason::MalformedResult);
    }
    tracing::info!(
        mutation = field,
        user = response.user.as_ref().map(|user| user.username.as_str()),
        "session updated"
    );
    UpdateOutcome::Applied
}
