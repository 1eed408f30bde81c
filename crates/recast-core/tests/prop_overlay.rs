//! Property-based tests for the overlay container
//!
//! These verify invariants that should hold for all plain-data records:
//! normalization round-trips, idempotent reads, and append-key freshness.

use proptest::prelude::*;
use recast_core::{Field, Overlay};
use serde_json::{json, Value};

// Strategy functions for property testing

/// Strategy for generating leaf JSON values (floats are excluded so equality
/// stays exact through an encode/decode cycle)
fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 _.-]{0,16}".prop_map(Value::String),
    ]
}

/// Strategy for generating nested JSON values of bounded depth
fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Strategy for generating plain-data records
fn record_strategy() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map("[a-z]{1,8}", json_value(), 0..6)
        .prop_map(|map| map.into_iter().collect())
}

fn overlay_of(entries: &[(String, Value)]) -> Overlay {
    entries
        .iter()
        .map(|(key, value)| (key.clone(), Field::Plain(value.clone())))
        .collect()
}

proptest! {
    /// For plain data, serializing and decoding returns the original record
    #[test]
    fn prop_json_round_trip(entries in record_strategy()) {
        let record = overlay_of(&entries);
        let encoded = record.to_json().unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();

        let expected = Value::Object(entries.iter().cloned().collect());
        prop_assert_eq!(decoded, expected);
    }

    /// get() without intervening mutation is idempotent
    #[test]
    fn prop_get_is_idempotent(entries in record_strategy()) {
        let record = overlay_of(&entries);
        prop_assert_eq!(record.get().unwrap(), record.get().unwrap());
    }

    /// collect() hands off exactly the normalized entries
    #[test]
    fn prop_collect_matches_json_serialize(entries in record_strategy()) {
        let record = overlay_of(&entries);
        prop_assert_eq!(record.collect().unwrap(), record.json_serialize().unwrap());
    }

    /// push always assigns a fresh key and grows the record by one
    #[test]
    fn prop_push_assigns_fresh_key(entries in record_strategy(), value in json_leaf()) {
        let mut record = overlay_of(&entries);
        let before = record.len();
        let existing: Vec<String> = record.keys().map(str::to_string).collect();

        let key = record.push(Field::Plain(value.clone()));

        prop_assert!(!existing.contains(&key));
        prop_assert_eq!(record.len(), before + 1);
        prop_assert_eq!(record.read(&key).unwrap(), value);
    }

    /// removing an absent key never changes the record
    #[test]
    fn prop_remove_absent_is_noop(entries in record_strategy()) {
        let mut record = overlay_of(&entries);
        let before = record.len();
        prop_assert!(record.remove("_absent_key_").is_none());
        prop_assert_eq!(record.len(), before);
    }

    /// iteration order survives normalization into the serialized form
    #[test]
    fn prop_iteration_order_matches_serialized_order(entries in record_strategy()) {
        let record = overlay_of(&entries);
        let iter_keys: Vec<String> = record.keys().map(str::to_string).collect();
        let map = record.json_serialize().unwrap();
        let map_keys: Vec<String> = map.keys().cloned().collect();
        prop_assert_eq!(iter_keys, map_keys);
    }
}
