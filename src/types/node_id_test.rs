//! Tests for `NodeId`.

use super::NodeId;

fn fetch_user() -> u32 {
  7
}

mod billing {
  pub fn fetch_user() -> u32 {
    9
  }
}

#[test]
fn qualified_joins_scope_and_name() {
  let id = NodeId::qualified("planner", "run");
  assert_eq!(id.as_str(), "planner::run");
  assert_eq!(id.name(), "run");
}

#[test]
fn qualified_with_empty_scope_is_just_name() {
  assert_eq!(NodeId::qualified("", "run").as_str(), "run");
}

#[test]
fn same_name_in_different_scopes_differs() {
  assert_ne!(
    NodeId::qualified("planner", "run"),
    NodeId::qualified("executor", "run")
  );
}

#[test]
fn of_fn_is_stable_and_scoped() {
  let a = NodeId::of_fn(&fetch_user);
  let b = NodeId::of_fn(&fetch_user);
  let c = NodeId::of_fn(&billing::fetch_user);
  assert_eq!(a, b);
  assert_ne!(a, c);
  assert!(a.as_str().ends_with("fetch_user"));
  assert!(c.as_str().contains("billing"));
  assert_eq!(fetch_user() + billing::fetch_user(), 16);
}

#[test]
fn serializes_as_plain_string() {
  let id = NodeId::new("a::b");
  assert_eq!(serde_json::to_string(&id).unwrap(), "\"a::b\"");
  let back: NodeId = serde_json::from_str("\"a::b\"").unwrap();
  assert_eq!(back, id);
}

#[test]
fn display_and_conversions() {
  let id: NodeId = "step".into();
  assert_eq!(id.to_string(), "step");
  let owned: NodeId = String::from("step").into();
  assert_eq!(owned, id);
  assert!(!id.is_empty());
  assert!(NodeId::new("").is_empty());
}
