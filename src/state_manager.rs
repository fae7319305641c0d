//! Concurrency-safe registry of node histories for one session.
//!
//! A single `parking_lot::Mutex` guards every read and write of the node map,
//! the re-run marks and the replay mode. Checkpoint bookkeeping is cheap next to
//! the work of the wrapped callables, so all operations are serialized per
//! manager rather than per node. File I/O in [StateManager::persist_to_file] and
//! [StateManager::load_from_file] runs outside the lock.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::checkpoint_io;
use crate::codec::{self, StateDocument};
use crate::config::ReplayMode;
use crate::error::ReplayError;
use crate::types::{Checkpoint, NodeHistory, NodeId, StoreMap, TimelineEntry};

#[derive(Debug, Default)]
struct Inner {
  nodes: BTreeMap<NodeId, NodeHistory>,
  rerun: BTreeSet<NodeId>,
  mode: ReplayMode,
}

/// Registry mapping [NodeId] to its [NodeHistory] for one session.
///
/// Construct one per session and share it as `Arc<StateManager>` with every
/// [crate::Recordable] that should see the same checkpoints.
#[derive(Debug)]
pub struct StateManager {
  session_id: i64,
  inner: Mutex<Inner>,
}

impl Default for StateManager {
  fn default() -> Self {
    Self::new()
  }
}

impl StateManager {
  /// New empty manager whose session id is the current unix time in seconds.
  pub fn new() -> Self {
    Self::with_session_id(chrono::Utc::now().timestamp())
  }

  pub fn with_session_id(session_id: i64) -> Self {
    Self {
      session_id,
      inner: Mutex::new(Inner::default()),
    }
  }

  pub fn with_mode(self, mode: ReplayMode) -> Self {
    self.inner.lock().mode = mode;
    self
  }

  pub fn session_id(&self) -> i64 {
    self.session_id
  }

  pub fn mode(&self) -> ReplayMode {
    self.inner.lock().mode
  }

  pub fn set_mode(&self, mode: ReplayMode) {
    self.inner.lock().mode = mode;
  }

  /// Appends a `Run` checkpoint stamped with this session and the current time.
  pub fn add_checkpoint(
    &self,
    node_id: &NodeId,
    inputs: Value,
    output: Value,
    execution_time: f64,
    shared_store_state: Option<StoreMap>,
  ) {
    let checkpoint = Checkpoint::new(self.session_id, inputs, output, execution_time)
      .with_shared_store_state(shared_store_state);
    self.append_checkpoint(node_id, checkpoint);
  }

  /// Appends a pre-built checkpoint, creating the node's history if absent.
  ///
  /// Also clears any pending [StateManager::mark_for_rerun] for the node.
  #[instrument(level = "trace", skip(self, node_id, checkpoint), fields(node_id = %node_id))]
  pub fn append_checkpoint(&self, node_id: &NodeId, checkpoint: Checkpoint) -> Arc<Checkpoint> {
    let checkpoint = Arc::new(checkpoint);
    let attempt = {
      let mut inner = self.inner.lock();
      let history = inner
        .nodes
        .entry(node_id.clone())
        .or_insert_with(|| NodeHistory::new(node_id.clone()));
      history.push(Arc::clone(&checkpoint));
      let attempt = history.len() - 1;
      inner.rerun.remove(node_id);
      attempt
    };
    debug!(
      node_id = %node_id,
      attempt,
      status = %checkpoint.status,
      execution_time = checkpoint.execution_time,
      error = checkpoint.error.as_deref(),
      "checkpoint recorded"
    );
    checkpoint
  }

  /// Latest checkpoint for `node_id`, if any.
  pub fn get_checkpoint(&self, node_id: &NodeId) -> Option<Arc<Checkpoint>> {
    let inner = self.inner.lock();
    inner.nodes.get(node_id).and_then(|h| h.latest().cloned())
  }

  /// Latest checkpoint if it may be replayed right now.
  ///
  /// None when the manager is not in [ReplayMode::Replay], when the node is
  /// marked for re-run, or when the latest attempt carries an error.
  pub fn replayable_checkpoint(&self, node_id: &NodeId) -> Option<Arc<Checkpoint>> {
    let inner = self.inner.lock();
    if !inner.mode.replays() || inner.rerun.contains(node_id) {
      return None;
    }
    inner
      .nodes
      .get(node_id)
      .and_then(|h| h.latest())
      .filter(|c| !c.is_error())
      .cloned()
  }

  /// Forces the next call of `node_id` to execute and record again.
  ///
  /// Earlier checkpoints are kept; the re-run appends a new one.
  pub fn mark_for_rerun(&self, node_id: &NodeId) {
    self.inner.lock().rerun.insert(node_id.clone());
  }

  pub fn is_marked_for_rerun(&self, node_id: &NodeId) -> bool {
    self.inner.lock().rerun.contains(node_id)
  }

  /// Copy of the history for `node_id`. Checkpoints are shared, not cloned.
  pub fn history(&self, node_id: &NodeId) -> Option<NodeHistory> {
    self.inner.lock().nodes.get(node_id).cloned()
  }

  pub fn node_ids(&self) -> Vec<NodeId> {
    self.inner.lock().nodes.keys().cloned().collect()
  }

  pub fn checkpoint_count(&self) -> usize {
    self.inner.lock().nodes.values().map(NodeHistory::len).sum()
  }

  /// Every checkpoint across all nodes, oldest first.
  ///
  /// Histories are merged by timestamp, ties going to the smaller node id. A
  /// node's attempts always keep their append order, even when the wall clock
  /// stepped backwards between them.
  pub fn timeline(&self) -> Vec<TimelineEntry> {
    let histories: Vec<NodeHistory> = self.inner.lock().nodes.values().cloned().collect();
    let total = histories.iter().map(NodeHistory::len).sum();
    let mut heads = vec![0_usize; histories.len()];
    let mut entries = Vec::with_capacity(total);
    while entries.len() < total {
      let next = histories
        .iter()
        .enumerate()
        .filter_map(|(i, h)| h.checkpoints.get(heads[i]).map(|cp| (i, cp)))
        .min_by(|(_, a), (_, b)| a.timestamp.total_cmp(&b.timestamp));
      let Some((i, checkpoint)) = next else {
        break;
      };
      entries.push(TimelineEntry {
        node_id: histories[i].id.clone(),
        attempt: heads[i],
        checkpoint: Arc::clone(checkpoint),
      });
      heads[i] += 1;
    }
    entries
  }

  /// Snapshot of the session id and all histories.
  pub fn export_state(&self) -> StateDocument {
    let inner = self.inner.lock();
    StateDocument {
      session_id: self.session_id,
      nodes: inner.nodes.values().cloned().collect(),
    }
  }

  /// Replaces all histories with those in `document`.
  ///
  /// The manager keeps its own session id. On error nothing changes.
  #[instrument(level = "trace", skip(self, document))]
  pub fn import_state(&self, document: StateDocument) -> Result<(), ReplayError> {
    document.validate()?;
    let nodes: BTreeMap<NodeId, NodeHistory> = document
      .nodes
      .into_iter()
      .map(|h| (h.id.clone(), h))
      .collect();
    let count = nodes.len();
    self.inner.lock().nodes = nodes;
    debug!(
      nodes = count,
      from_session = document.session_id,
      "state imported"
    );
    Ok(())
  }

  /// Decodes a JSON value and imports it. `Format` on missing or mistyped fields.
  pub fn import_value(&self, value: Value) -> Result<(), ReplayError> {
    self.import_state(codec::decode_value(value)?)
  }

  /// Writes the exported state to `path` as JSON.
  #[instrument(level = "trace", skip(self, path), fields(path = %path.as_ref().display()))]
  pub fn persist_to_file(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
    let doc = self.export_state();
    checkpoint_io::save_state(path.as_ref(), &doc)?;
    debug!(checkpoints = doc.checkpoint_count(), "state persisted");
    Ok(())
  }

  /// Replaces all histories with those stored at `path`.
  ///
  /// Reading and decoding finish before anything in memory is touched, so a
  /// failed load leaves the manager unchanged.
  #[instrument(level = "trace", skip(self, path), fields(path = %path.as_ref().display()))]
  pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
    let doc = checkpoint_io::load_state(path.as_ref())?;
    self.import_state(doc)
  }
}
