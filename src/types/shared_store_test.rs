//! Tests for `SharedStore`.

use serde_json::json;

use super::{SharedStore, StoreMap};

fn map(v: serde_json::Value) -> StoreMap {
  v.as_object().cloned().unwrap()
}

#[test]
fn clones_share_the_same_map() {
  let store = SharedStore::new();
  let handle = store.clone();
  handle.insert("x", 1);
  assert_eq!(store.get("x"), Some(json!(1)));
  assert!(store.ptr_eq(&handle));
  assert!(!store.ptr_eq(&SharedStore::new()));
}

#[test]
fn snapshot_is_independent_of_later_mutation() {
  let store = SharedStore::from_map(map(json!({"x": 1})));
  let snap = store.snapshot();
  store.insert("x", 2);
  store.insert("y", 3);
  assert_eq!(snap.get("x"), Some(&json!(1)));
  assert!(!snap.contains_key("y"));
}

#[test]
fn restore_clears_then_repopulates() {
  let store = SharedStore::from_map(map(json!({"stale": true, "x": 1})));
  store.restore(&map(json!({"x": 2, "y": 3})));
  assert_eq!(store.snapshot(), map(json!({"x": 2, "y": 3})));
  assert!(!store.contains_key("stale"));
}

#[test]
fn keeps_insertion_order() {
  let store = SharedStore::new();
  store.insert("zeta", 1);
  store.insert("alpha", 2);
  let keys: Vec<String> = store.snapshot().keys().cloned().collect();
  assert_eq!(keys, vec!["zeta", "alpha"]);
}

#[test]
fn serializes_as_its_map() {
  let store = SharedStore::new();
  store.insert("k", "v");
  assert_eq!(serde_json::to_value(&store).unwrap(), json!({"k": "v"}));
}

#[test]
fn with_gives_exclusive_access() {
  let store = SharedStore::new();
  let n = store.with(|m| {
    m.insert("a".to_string(), json!(1));
    m.insert("b".to_string(), json!(2));
    m.len()
  });
  assert_eq!(n, 2);
  assert_eq!(store.remove("a"), Some(json!(1)));
  assert_eq!(store.len(), 1);
  assert!(!store.is_empty());
}
