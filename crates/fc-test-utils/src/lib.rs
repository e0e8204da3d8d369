//! Testing utilities for the forum cache workspace
//!
//! Shared fixtures for server payloads and client setup.

#![allow(missing_docs)]

use fc_coordinator::{create_client, Client, ClientConfig, QueryRead, RenderContext};
use fc_store::{Cache, EntityKey, FieldKey};
use serde_json::{json, Map, Value};

pub fn post(id: i64, points: i64, vote_status: Option<i64>) -> Value {
    json!({
        "__typename": "Post",
        "id": id,
        "title": format!("post {id}"),
        "textSnippet": "...",
        "points": points,
        "voteStatus": vote_status,
        "creator": user(100 + id, &format!("author{id}")),
    })
}

pub fn reply(id: i64, post_id: i64, points: i64) -> Value {
    json!({
        "__typename": "Reply",
        "id": id,
        "postId": post_id,
        "text": format!("reply {id}"),
        "points": points,
        "voteStatus": null,
    })
}

pub fn user(id: i64, username: &str) -> Value {
    json!({"__typename": "User", "id": id, "username": username})
}

/// `{ posts: PaginatedPosts }` response for `ids`
pub fn posts_page(ids: &[i64], has_more: bool) -> Value {
    let posts: Vec<Value> = ids.iter().map(|&id| post(id, 0, None)).collect();
    json!({"posts": {"__typename": "PaginatedPosts", "hasMore": has_more, "posts": posts}})
}

/// `{ replies: PaginatedReplies }` response for `ids` under `post_id`
pub fn replies_page(post_id: i64, ids: &[i64], has_more: bool) -> Value {
    let replies: Vec<Value> = ids.iter().map(|&id| reply(id, post_id, 0)).collect();
    json!({"replies": {"__typename": "PaginatedReplies", "hasMore": has_more, "replies": replies}})
}

/// `{ <field>: UserResponse }` mutation result
pub fn user_response(field: &str, user: Option<Value>, errors: &[(&str, &str)]) -> Value {
    let errors: Option<Vec<Value>> = (!errors.is_empty()).then(|| {
        errors
            .iter()
            .map(|(field, message)| json!({"field": field, "message": message}))
            .collect()
    });
    let mut result = Map::new();
    result.insert(field.to_string(), json!({"errors": errors, "user": user}));
    Value::Object(result)
}

pub fn setup_test_client() -> Client {
    setup_test_client_with(ClientConfig::default())
}

pub fn setup_test_client_with(config: ClientConfig) -> Client {
    create_client(&config, &RenderContext::Browser).unwrap()
}

/// Ids of the items of list `list_field` inside root field `field` of a hit
pub fn item_ids(read: &QueryRead, field: &str, list_field: &str) -> Vec<i64> {
    let data = read.data().expect("expected cache hit");
    data[field][list_field]
        .as_array()
        .expect("expected item list")
        .iter()
        .map(|item| item["id"].as_i64().expect("expected integer id"))
        .collect()
}

/// Number of `field` keys recorded on the root, whatever their arguments
pub fn root_field_count(cache: &dyn Cache, field: &str) -> usize {
    fc_store::fields_named(cache, &EntityKey::root(), field).len()
}

/// Scalar field of a cached entity
pub fn entity_field(cache: &fc_store::NormalizedCache, typename: &str, id: i64, field: &str) -> Option<Value> {
    cache.read_field(&EntityKey::entity(typename, &id.to_string()), &FieldKey::plain(field))
}
