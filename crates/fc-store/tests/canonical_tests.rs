use fc_store::{Arguments, FieldKey};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arguments_from_pairs(pairs: &[(String, i64)]) -> Arguments {
    pairs
        .iter()
        .fold(Arguments::new(), |args, (name, value)| args.with(name.clone(), *value))
}

#[test]
fn nested_objects_are_sorted() {
    let args = Arguments::from_json(&json!({"filter": {"z": [{"b": 1, "a": 2}], "a": true}}))
        .unwrap();
    assert_eq!(args.canonical(), r#"{"filter":{"a":true,"z":[{"a":2,"b":1}]}}"#);
}

#[test]
fn strings_are_escaped() {
    let args = Arguments::new().with("q", "say \"hi\"");
    assert_eq!(args.canonical(), r#"{"q":"say \"hi\""}"#);
}

proptest! {
    #[test]
    fn prop_insertion_order_does_not_change_field_key(
        pairs in proptest::collection::vec(("[a-z]{1,6}", -1000i64..1000), 0..8)
    ) {
        let mut reversed = pairs.clone();
        reversed.reverse();

        // later duplicates win in both orders only when names are unique
        let mut names: Vec<_> = pairs.iter().map(|(n, _)| n.clone()).collect();
        names.sort();
        names.dedup();
        prop_assume!(names.len() == pairs.len());

        let a = FieldKey::new("posts", arguments_from_pairs(&pairs));
        let b = FieldKey::new("posts", arguments_from_pairs(&reversed));
        prop_assert_eq!(a.as_str(), b.as_str());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_canonical_form_is_valid_json(
        pairs in proptest::collection::vec(("[a-zA-Z_]{1,6}", any::<i32>()), 0..8)
    ) {
        let args = pairs
            .iter()
            .fold(Arguments::new(), |args, (name, value)| args.with(name.clone(), *value));
        let parsed: Value = serde_json::from_str(&args.canonical()).unwrap();
        prop_assert_eq!(Arguments::from_json(&parsed).unwrap(), args);
    }
}
