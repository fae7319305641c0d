//! End-to-end record/replay across process-like sessions: record a workflow,
//! persist it, load it into a fresh manager and replay it.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use streamweave_replay::{
  NodeId, NodeStatus, Recordable, ReplayError, ReplayMode, STATE_FILENAME, SharedStore,
  StateManager, StoreMap,
};

struct Workflow {
  plan: Recordable<Box<dyn Fn(SharedStore) -> Result<Vec<String>, String> + Send + Sync>, SharedStore>,
  execute: Recordable<Box<dyn Fn((SharedStore, String)) -> Result<u32, String> + Send + Sync>, (SharedStore, String)>,
}

fn workflow(manager: &Arc<StateManager>, calls: &Arc<AtomicUsize>) -> Workflow {
  let plan_calls = Arc::clone(calls);
  let plan: Box<dyn Fn(SharedStore) -> Result<Vec<String>, String> + Send + Sync> =
    Box::new(move |store: SharedStore| {
      plan_calls.fetch_add(1, Ordering::SeqCst);
      store.insert("plan", json!(["search", "answer"]));
      Ok(vec!["search".to_string(), "answer".to_string()])
    });
  let exec_calls = Arc::clone(calls);
  let execute: Box<dyn Fn((SharedStore, String)) -> Result<u32, String> + Send + Sync> =
    Box::new(move |(store, step): (SharedStore, String)| {
      exec_calls.fetch_add(1, Ordering::SeqCst);
      let mut done: Vec<Value> = store
        .get("done")
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default();
      done.push(json!(step));
      let n = done.len() as u32;
      store.insert("done", done);
      Ok(n)
    });
  Workflow {
    plan: Recordable::new(
      Arc::clone(manager),
      NodeId::qualified("agent::planner", "run"),
      plan,
    )
    .with_shared_state(|s: &SharedStore| Some(s.clone())),
    execute: Recordable::new(
      Arc::clone(manager),
      NodeId::qualified("agent::executor", "run"),
      execute,
    )
    .with_shared_state(|(s, _): &(SharedStore, String)| Some(s.clone())),
  }
}

fn drive(w: &Workflow) -> (Vec<NodeStatus>, StoreMap) {
  let store = SharedStore::new();
  let plan = w.plan.invoke(store.clone()).unwrap();
  let exec = w
    .execute
    .invoke((store.clone(), plan.output[0].clone()))
    .unwrap();
  (vec![plan.status, exec.status], store.snapshot())
}

#[test]
fn recorded_session_replays_after_reload() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join(STATE_FILENAME);

  let first_calls = Arc::new(AtomicUsize::new(0));
  let first = Arc::new(StateManager::with_session_id(100));
  let (statuses, recorded_store) = drive(&workflow(&first, &first_calls));
  assert_eq!(statuses, vec![NodeStatus::Run, NodeStatus::Run]);
  assert_eq!(first_calls.load(Ordering::SeqCst), 2);
  first.persist_to_file(&path).unwrap();

  let second_calls = Arc::new(AtomicUsize::new(0));
  let second = Arc::new(StateManager::with_session_id(200));
  second.load_from_file(&path).unwrap();
  let (statuses, replayed_store) = drive(&workflow(&second, &second_calls));
  assert_eq!(statuses, vec![NodeStatus::Cached, NodeStatus::Cached]);
  assert_eq!(second_calls.load(Ordering::SeqCst), 0);
  assert_eq!(replayed_store, recorded_store);
  assert_eq!(replayed_store["done"], json!(["search"]));

  let cp = second
    .get_checkpoint(&NodeId::new("agent::planner::run"))
    .unwrap();
  assert_eq!(cp.session_id, 100);
}

#[test]
fn rerun_appends_without_losing_history() {
  let calls = Arc::new(AtomicUsize::new(0));
  let m = Arc::new(StateManager::with_session_id(1));
  let w = workflow(&m, &calls);
  drive(&w);
  m.mark_for_rerun(w.execute.node_id());
  let (statuses, _) = drive(&w);
  assert_eq!(statuses, vec![NodeStatus::Cached, NodeStatus::Run]);
  assert_eq!(m.history(w.execute.node_id()).unwrap().len(), 2);
  assert_eq!(m.history(w.plan.node_id()).unwrap().len(), 1);
  assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn same_name_in_different_scopes_keeps_separate_histories() {
  let calls = Arc::new(AtomicUsize::new(0));
  let m = Arc::new(StateManager::with_session_id(1));
  drive(&workflow(&m, &calls));
  let ids: Vec<String> = m.node_ids().iter().map(|i| i.to_string()).collect();
  assert_eq!(ids, vec!["agent::executor::run", "agent::planner::run"]);
}

#[test]
fn persisted_file_has_documented_layout() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join(STATE_FILENAME);
  let m = Arc::new(StateManager::with_session_id(77));
  let step = Recordable::new(Arc::clone(&m), "layout::step", |n: u32| {
    Ok::<_, Infallible>(n)
  });
  step.call(5).unwrap();
  m.persist_to_file(&path).unwrap();

  let v: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
  assert_eq!(v["session_id"], 77);
  let node = &v["nodes"][0];
  assert_eq!(node["id"], "layout::step");
  let cp = &node["checkpoints"][0];
  assert_eq!(cp["status"], "run");
  assert_eq!(cp["inputs"], 5);
  assert_eq!(cp["output"], 5);
  assert!(cp["error"].is_null());
  assert!(cp["shared_store_state"].is_null());
  assert!(cp["execution_time"].is_f64());
  assert!(cp["timestamp"].is_f64());
}

#[test]
fn truncated_file_fails_and_keeps_memory() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join(STATE_FILENAME);
  let m = StateManager::with_session_id(1);
  m.add_checkpoint(&NodeId::new("a"), json!(null), json!(1), 0.0, None);
  m.persist_to_file(&path).unwrap();
  let text = std::fs::read_to_string(&path).unwrap();
  std::fs::write(&path, &text[..text.len() / 2]).unwrap();

  let other = StateManager::with_session_id(2);
  other.add_checkpoint(&NodeId::new("b"), json!(null), json!(2), 0.0, None);
  assert!(matches!(
    other.load_from_file(&path),
    Err(ReplayError::Format(_))
  ));
  assert_eq!(other.node_ids(), vec![NodeId::new("b")]);
}

#[test]
fn record_only_session_can_be_replayed_later() {
  let recorder = Arc::new(StateManager::with_session_id(1).with_mode(ReplayMode::RecordOnly));
  let step = Recordable::new(Arc::clone(&recorder), "n", |n: u32| Ok::<_, Infallible>(n * n));
  step.call(3).unwrap();
  step.call(4).unwrap();

  let replayer = Arc::new(StateManager::with_session_id(2));
  replayer.import_state(recorder.export_state()).unwrap();
  let step = Recordable::new(Arc::clone(&replayer), "n", |n: u32| Ok::<_, Infallible>(n));
  assert_eq!(step.call(0).unwrap(), 16);
}
