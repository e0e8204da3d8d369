//! Typed mutation names and arguments
//!
//! The execution layer hands over a mutation name and its JSON variables.
//! [`MutationName`] closes the set of names the coordinator knows, and
//! [`Mutation::parse`] narrows the variables into one argument type per
//! mutation before any updater sees them.

use crate::error::ArgsError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Mutation names with a cache policy
///
/// Every name is either handled by an updater or explicitly ignored; names
/// outside this set pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationName {
    /// Vote on a post
    Vote,
    /// Vote on a reply
    VoteReply,
    /// Create a post
    CreatePost,
    /// Create a reply
    CreateReply,
    /// Delete a post
    DeletePost,
    /// Delete a reply
    DeleteReply,
    /// Log in
    Login,
    /// Log out
    Logout,
    /// Register a new account
    Register,
    /// Edit a post; the returned entity updates itself
    UpdatePost,
    /// Change password; no cached data depends on it
    ChangePassword,
    /// Request a password reset email
    ForgotPassword,
}

impl MutationName {
    /// All known names
    pub const ALL: [Self; 12] = [
        Self::Vote,
        Self::VoteReply,
        Self::CreatePost,
        Self::CreateReply,
        Self::DeletePost,
        Self::DeleteReply,
        Self::Login,
        Self::Logout,
        Self::Register,
        Self::UpdatePost,
        Self::ChangePassword,
        Self::ForgotPassword,
    ];

    /// GraphQL field name of the mutation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vote => "vote",
            Self::VoteReply => "voteReply",
            Self::CreatePost => "createPost",
            Self::CreateReply => "createReply",
            Self::DeletePost => "deletePost",
            Self::DeleteReply => "deleteReply",
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Register => "register",
            Self::UpdatePost => "updatePost",
            Self::ChangePassword => "changePassword",
            Self::ForgotPassword => "forgotPassword",
        }
    }
}

impl Display for MutationName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationName {
    type Err = ArgsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ArgsError::UnknownMutation(s.to_string()))
    }
}

/// Direction of a vote
///
/// Only two directions exist; the flip rule in the vote updater depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
    /// +1
    Up,
    /// -1
    Down,
}

impl VoteValue {
    /// Signed weight of the vote
    #[inline]
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = ArgsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(ArgsError::InvalidVoteValue(other)),
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        value.as_i64()
    }
}

/// `vote(postId, value)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteArgs {
    pub post_id: i64,
    pub value: VoteValue,
}

/// `voteReply(replyId, value)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReplyArgs {
    pub reply_id: i64,
    pub value: VoteValue,
}

/// Post contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub text: String,
}

/// `createPost(input)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePostArgs {
    pub input: PostInput,
}

/// Reply contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyInput {
    pub post_id: i64,
    pub text: String,
}

/// `createReply(input)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReplyArgs {
    pub input: ReplyInput,
}

/// `deletePost(id)` / `deleteReply(id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteArgs {
    pub id: i64,
}

/// `login(usernameOrEmail, password)`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginArgs {
    pub username_or_email: String,
    pub password: String,
}

/// Registration form
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernamePasswordInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `register(options)`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterArgs {
    pub options: UsernamePasswordInput,
}

// Credentials stay out of logs
impl fmt::Debug for LoginArgs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginArgs")
            .field("username_or_email", &self.username_or_email)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UsernamePasswordInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernamePasswordInput")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for RegisterArgs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterArgs")
            .field("options", &self.options)
            .finish()
    }
}

/// A mutation with validated arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Vote(VoteArgs),
    VoteReply(VoteReplyArgs),
    CreatePost(CreatePostArgs),
    CreateReply(CreateReplyArgs),
    DeletePost(DeleteArgs),
    DeleteReply(DeleteArgs),
    Login(LoginArgs),
    Logout,
    Register(RegisterArgs),
    /// Known mutation without a cache side effect
    Ignored(MutationName),
}

impl Mutation {
    /// Narrow JSON variables into the argument type of `name`
    ///
    /// # Errors
    /// Returns error if the variables do not match the mutation's shape
    pub fn parse(name: MutationName, variables: &Value) -> Result<Self, ArgsError> {
        Ok(match name {
            MutationName::Vote => Self::Vote(from_variables(name, variables)?),
            MutationName::VoteReply => Self::VoteReply(from_variables(name, variables)?),
            MutationName::CreatePost => Self::CreatePost(from_variables(name, variables)?),
            MutationName::CreateReply => Self::CreateReply(from_variables(name, variables)?),
            MutationName::DeletePost => Self::DeletePost(from_variables(name, variables)?),
            MutationName::DeleteReply => Self::DeleteReply(from_variables(name, variables)?),
            MutationName::Login => Self::Login(from_variables(name, variables)?),
            MutationName::Logout => Self::Logout,
            MutationName::Register => Self::Register(from_variables(name, variables)?),
            MutationName::UpdatePost
            | MutationName::ChangePassword
            | MutationName::ForgotPassword => Self::Ignored(name),
        })
    }

    /// Name of this mutation
    #[must_use]
    pub const fn name(&self) -> MutationName {
        match self {
            Self::Vote(_) => MutationName::Vote,
            Self::VoteReply(_) => MutationName::VoteReply,
            Self::CreatePost(_) => MutationName::CreatePost,
            Self::CreateReply(_) => MutationName::CreateReply,
            Self::DeletePost(_) => MutationName::DeletePost,
            Self::DeleteReply(_) => MutationName::DeleteReply,
            Self::Login(_) => MutationName::Login,
            Self::Logout => MutationName::Logout,
            Self::Register(_) => MutationName::Register,
            Self::Ignored(name) => *name,
        }
    }
}

fn from_variables<T: DeserializeOwned>(name: MutationName, variables: &Value) -> Result<T, ArgsError> {
    serde_json::from_value(variables.clone()).map_err(|source| ArgsError::Invalid {
        mutation: name,
        source,
    })
}
