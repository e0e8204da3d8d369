use fc_coordinator::documents;
use fc_coordinator::{ClientConfig, MergeMode, PaginationConfig, QueryRead};
use fc_test_utils::{item_ids, posts_page, replies_page, setup_test_client, setup_test_client_with};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn cursor_for(index: usize) -> Option<String> {
    (index > 0).then(|| format!("c{index}"))
}

proptest! {
    #[test]
    fn prop_pages_concatenate_in_fetch_order(
        pages in proptest::collection::vec(proptest::collection::vec(1..40i64, 0..6), 1..6)
    ) {
        let mut client = setup_test_client();
        for (index, ids) in pages.iter().enumerate() {
            let cursor = cursor_for(index);
            client
                .write_result(&documents::posts(5, cursor.as_deref()), &posts_page(ids, true))
                .unwrap();
        }

        let read = client.read(&documents::posts(5, None));
        let expected: Vec<i64> = pages.concat();
        prop_assert_eq!(item_ids(&read, "posts", "posts"), expected);
        let complete = matches!(read, QueryRead::Hit { partial: false, .. });
        prop_assert!(complete);
    }

    #[test]
    fn prop_any_exhausted_page_clears_has_more(
        flags in proptest::collection::vec(any::<bool>(), 1..8)
    ) {
        let mut client = setup_test_client();
        for (index, has_more) in flags.iter().enumerate() {
            let cursor = cursor_for(index);
            client
                .write_result(&documents::posts(5, cursor.as_deref()), &posts_page(&[i64::try_from(index).unwrap()], *has_more))
                .unwrap();
        }

        let read = client.read(&documents::posts(5, None));
        let has_more = read.data().unwrap()["posts"]["hasMore"].as_bool().unwrap();
        prop_assert_eq!(has_more, flags.iter().all(|flag| *flag));
    }
}

#[test]
fn test_duplicates_are_kept() {
    let mut client = setup_test_client();
    client.write_result(&documents::posts(2, None), &posts_page(&[1, 2], true)).unwrap();
    client.write_result(&documents::posts(2, Some("2")), &posts_page(&[2, 3], true)).unwrap();

    let read = client.read(&documents::posts(2, Some("2")));
    assert_eq!(item_ids(&read, "posts", "posts"), vec![1, 2, 2, 3]);
}

#[test]
fn test_miss_before_first_page() {
    let client = setup_test_client();
    assert_eq!(client.read(&documents::posts(10, None)), QueryRead::Miss);
}

#[test]
fn test_uncached_page_reads_partial() {
    let mut client = setup_test_client();
    client.write_result(&documents::posts(10, None), &posts_page(&[1, 2], true)).unwrap();

    let read = client.read(&documents::posts(10, Some("2")));
    assert!(matches!(read, QueryRead::Hit { partial: true, .. }));
    assert_eq!(item_ids(&read, "posts", "posts"), vec![1, 2]);
}

#[test]
fn test_empty_page_is_cached_page() {
    let mut client = setup_test_client();
    client.write_result(&documents::posts(10, None), &posts_page(&[1], true)).unwrap();
    client.write_result(&documents::posts(10, Some("1")), &posts_page(&[], false)).unwrap();

    let read = client.read(&documents::posts(10, Some("1")));
    assert!(matches!(read, QueryRead::Hit { partial: false, .. }));
    assert_eq!(read.data().unwrap()["posts"]["hasMore"], json!(false));
}

#[test]
fn test_argument_order_does_not_matter() {
    let mut client = setup_test_client();
    client.write_result(&documents::posts(10, None), &posts_page(&[1], true)).unwrap();

    let reordered = fc_store::QueryDocument::new(
        "Posts",
        vec![fc_store::RootField::new("posts").with_arguments(
            fc_store::Arguments::from_json(&json!({"limit": 10, "cursor": null})).unwrap(),
        )],
    );
    assert!(matches!(client.read(&reordered), QueryRead::Hit { partial: false, .. }));
}

#[test]
fn test_replies_need_exact_arguments_by_default() {
    let mut client = setup_test_client();
    client.write_result(&documents::replies(1, 5, None), &replies_page(1, &[10], true)).unwrap();

    assert!(client.read(&documents::replies(1, 5, None)).data().is_some());
    assert_eq!(client.read(&documents::replies(1, 5, Some("10"))), QueryRead::Miss);
}

#[test]
fn test_replies_merge_when_registered() {
    let config = ClientConfig::default().with_paginated_field(PaginationConfig::replies());
    let mut client = setup_test_client_with(config);
    client.write_result(&documents::replies(1, 5, None), &replies_page(1, &[10, 11], true)).unwrap();
    client.write_result(&documents::replies(1, 5, Some("11")), &replies_page(1, &[12], false)).unwrap();

    let read = client.read(&documents::replies(1, 5, Some("11")));
    assert_eq!(item_ids(&read, "replies", "replies"), vec![10, 11, 12]);
    assert_eq!(read.data().unwrap()["replies"]["__typename"], json!("PaginatedReplies"));
}

#[test]
fn test_before_merge_mode_prepends_later_pages() {
    let config = ClientConfig {
        paginated_fields: vec![PaginationConfig::posts().with_merge_mode(MergeMode::Before)],
        ..ClientConfig::default()
    };
    let mut client = setup_test_client_with(config);
    client.write_result(&documents::posts(2, None), &posts_page(&[3, 4], true)).unwrap();
    client.write_result(&documents::posts(2, Some("3")), &posts_page(&[1, 2], false)).unwrap();

    let read = client.read(&documents::posts(2, None));
    assert_eq!(item_ids(&read, "posts", "posts"), vec![1, 2, 3, 4]);
}
