//! Forum query documents and schema names

use fc_store::{Arguments, QueryDocument, RootField};
use serde_json::Value;

/// Post entity typename
pub const POST_TYPENAME: &str = "Post";
/// Reply entity typename
pub const REPLY_TYPENAME: &str = "Reply";
/// User entity typename
pub const USER_TYPENAME: &str = "User";
/// Page aggregate of `posts`
pub const PAGINATED_POSTS: &str = "PaginatedPosts";
/// Page aggregate of `replies`
pub const PAGINATED_REPLIES: &str = "PaginatedReplies";

/// Root field listing posts
pub const POSTS_FIELD: &str = "posts";
/// Root field listing replies of a post
pub const REPLIES_FIELD: &str = "replies";
/// Root field holding the logged-in user
pub const ME_FIELD: &str = "me";

/// Session snapshot query: `{ me { id username } }`
#[must_use]
pub fn me() -> QueryDocument {
    QueryDocument::new("Me", vec![RootField::new(ME_FIELD)])
}

/// One page of posts
#[must_use]
pub fn posts(limit: i64, cursor: Option<&str>) -> QueryDocument {
    let arguments = Arguments::new()
        .with("limit", limit)
        .with("cursor", cursor.map_or(Value::Null, Value::from));
    QueryDocument::new(
        "Posts",
        vec![RootField::new(POSTS_FIELD).with_arguments(arguments)],
    )
}

/// One page of replies to `post_id`
#[must_use]
pub fn replies(post_id: i64, limit: i64, cursor: Option<&str>) -> QueryDocument {
    let arguments = Arguments::new()
        .with("postId", post_id)
        .with("limit", limit)
        .with("cursor", cursor.map_or(Value::Null, Value::from));
    QueryDocument::new(
        "Replies",
        vec![RootField::new(REPLIES_FIELD).with_arguments(arguments)],
    )
}

/// A single post
#[must_use]
pub fn post(id: i64) -> QueryDocument {
    QueryDocument::new(
        "Post",
        vec![RootField::new("post").with_arguments(Arguments::new().with("id", id))],
    )
}
