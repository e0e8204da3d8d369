use fc_coordinator::documents;
use fc_coordinator::updaters::{SkipReason, VoteTally};
use fc_coordinator::{UpdateOutcome, VoteValue};
use fc_test_utils::{entity_field, post, replies_page, setup_test_client};
use proptest::prelude::*;
use serde_json::{json, Value};

fn vote_value() -> impl Strategy<Value = VoteValue> {
    prop_oneof![Just(VoteValue::Up), Just(VoteValue::Down)]
}

fn client_with_post(points: i64, vote_status: Option<i64>) -> fc_coordinator::Client {
    let mut client = setup_test_client();
    let page = json!({"posts": {
        "__typename": "PaginatedPosts",
        "hasMore": false,
        "posts": [post(1, points, vote_status)]
    }});
    client.write_result(&documents::posts(10, None), &page).unwrap();
    client
}

fn vote(client: &mut fc_coordinator::Client, value: VoteValue) -> UpdateOutcome {
    client
        .apply_mutation(
            "vote",
            &json!({"postId": 1, "value": value.as_i64()}),
            &json!({"vote": true}),
        )
}

proptest! {
    #[test]
    fn prop_same_vote_twice_returns_to_baseline(points in -10_000i64..10_000, value in vote_value()) {
        let baseline = VoteTally::new(points, None);
        prop_assert_eq!(baseline.apply(value).apply(value), baseline);
    }

    #[test]
    fn prop_flip_moves_two_points(points in -10_000i64..10_000, value in vote_value()) {
        let opposite = match value {
            VoteValue::Up => VoteValue::Down,
            VoteValue::Down => VoteValue::Up,
        };
        let flipped = VoteTally::new(points, Some(opposite)).apply(value);
        prop_assert_eq!(flipped, VoteTally::new(points + 2 * value.as_i64(), Some(value)));
    }

    #[test]
    fn prop_cached_vote_round_trip(points in -1_000i64..1_000, value in vote_value()) {
        let mut client = client_with_post(points, None);
        prop_assert_eq!(vote(&mut client, value), UpdateOutcome::Applied);
        prop_assert_eq!(vote(&mut client, value), UpdateOutcome::Applied);

        prop_assert_eq!(entity_field(client.cache(), "Post", 1, "points"), Some(json!(points)));
        prop_assert_eq!(entity_field(client.cache(), "Post", 1, "voteStatus"), Some(Value::Null));
    }
}

#[test]
fn test_flip_down_to_up_on_cached_post() {
    let mut client = client_with_post(7, Some(-1));
    assert_eq!(vote(&mut client, VoteValue::Up), UpdateOutcome::Applied);

    assert_eq!(entity_field(client.cache(), "Post", 1, "points"), Some(json!(9)));
    assert_eq!(entity_field(client.cache(), "Post", 1, "voteStatus"), Some(json!(1)));

    let read = client.read(&documents::posts(10, None));
    assert_eq!(read.data().unwrap()["posts"]["posts"][0]["points"], json!(9));
}

#[test]
fn test_vote_leaves_other_fields() {
    let mut client = client_with_post(0, None);
    vote(&mut client, VoteValue::Down);
    assert_eq!(entity_field(client.cache(), "Post", 1, "title"), Some(json!("post 1")));
}

#[test]
fn test_vote_on_uncached_post_is_noop() {
    let mut client = client_with_post(0, None);
    let outcome = client
        .apply_mutation("vote", &json!({"postId": 99, "value": 1}), &json!({"vote": true}));
    assert_eq!(outcome, UpdateOutcome::Skipped(SkipReason::NotCached));
    assert!(!client.cache().contains(&fc_store::EntityKey::entity("Post", "99")));
}

#[test]
fn test_vote_reply() {
    let mut client = setup_test_client();
    client.write_result(&documents::replies(1, 5, None), &replies_page(1, &[4], false)).unwrap();

    let outcome = client
        .apply_mutation("voteReply", &json!({"replyId": 4, "value": -1}), &json!({"voteReply": true}));
    assert_eq!(outcome, UpdateOutcome::Applied);
    assert_eq!(entity_field(client.cache(), "Reply", 4, "points"), Some(json!(-1)));
    assert_eq!(entity_field(client.cache(), "Reply", 4, "voteStatus"), Some(json!(-1)));
}

#[test]
fn test_out_of_range_value_is_rejected() {
    let mut client = client_with_post(3, None);
    let outcome = client
        .apply_mutation("vote", &json!({"postId": 1, "value": 2}), &json!({"vote": true}));
    assert_eq!(outcome, UpdateOutcome::Skipped(SkipReason::InvalidArguments));
    assert_eq!(entity_field(client.cache(), "Post", 1, "points"), Some(json!(3)));
}
