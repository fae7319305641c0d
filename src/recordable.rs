//! Record/replay wrapper around a node callable.
//!
//! A [Recordable] owns a callable `Fn(A) -> Result<T, E>` and a node id fixed at
//! construction. Each call either replays the node's latest checkpoint or runs
//! the callable and appends a new one:
//!
//! - **Replay**: the stored output is decoded into `T` and returned without
//!   running the callable. If the checkpoint carries a shared-store snapshot and
//!   the extractor finds a [SharedStore] in the arguments, that store is cleared
//!   and refilled from the snapshot first.
//! - **Record**: inputs are captured, the callable runs under a per-thread CPU
//!   stopwatch, and one checkpoint is appended holding the output and the
//!   store's post-call contents. An `Err` from the callable is returned as-is
//!   and nothing is recorded, so the next call runs again.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::capture::capture_inputs;
use crate::cpu_clock::CpuStopwatch;
use crate::state_manager::StateManager;
use crate::types::{Checkpoint, NodeId, NodeStatus, SharedStore};

/// Finds the shared store among a call's arguments.
pub type SharedStateExtractor<A> = Box<dyn Fn(&A) -> Option<SharedStore> + Send + Sync>;

/// Result of one call plus how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation<T> {
  pub output: T,
  pub status: NodeStatus,
}

/// A callable instrumented for record and replay.
pub struct Recordable<F, A> {
  node_id: NodeId,
  manager: Arc<StateManager>,
  func: F,
  extract: Option<SharedStateExtractor<A>>,
  _args: PhantomData<fn(A)>,
}

impl<F, A> fmt::Debug for Recordable<F, A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Recordable")
      .field("node_id", &self.node_id)
      .field("session_id", &self.manager.session_id())
      .field("shared_state", &self.extract.is_some())
      .finish()
  }
}

impl<F, A> Recordable<F, A> {
  pub fn new(manager: Arc<StateManager>, node_id: impl Into<NodeId>, func: F) -> Self {
    Self {
      node_id: node_id.into(),
      manager,
      func,
      extract: None,
      _args: PhantomData,
    }
  }

  /// Like [Recordable::new] with the id taken from the callable's type name.
  /// Only meaningful for function items; see [NodeId::of_fn].
  pub fn from_fn(manager: Arc<StateManager>, func: F) -> Self {
    let node_id = NodeId::of_fn(&func);
    Self::new(manager, node_id, func)
  }

  /// Declares where the shared store lives in the arguments.
  ///
  /// Without an extractor, replay restores the output only.
  pub fn with_shared_state<X>(mut self, extract: X) -> Self
  where
    X: Fn(&A) -> Option<SharedStore> + Send + Sync + 'static,
  {
    self.extract = Some(Box::new(extract));
    self
  }

  pub fn node_id(&self) -> &NodeId {
    &self.node_id
  }

  pub fn manager(&self) -> &Arc<StateManager> {
    &self.manager
  }
}

impl<F, A, T, E> Recordable<F, A>
where
  F: Fn(A) -> Result<T, E>,
  A: Serialize,
  T: Serialize + DeserializeOwned,
{
  /// Same contract as the wrapped callable.
  pub fn call(&self, args: A) -> Result<T, E> {
    self.invoke(args).map(|inv| inv.output)
  }

  /// Like [Recordable::call], also reporting whether the node ran or replayed.
  #[instrument(level = "trace", skip_all, fields(node_id = %self.node_id))]
  pub fn invoke(&self, args: A) -> Result<Invocation<T>, E> {
    if !self.manager.mode().records() {
      let output = (self.func)(args)?;
      return Ok(Invocation {
        output,
        status: NodeStatus::Run,
      });
    }
    if let Some(output) = self.replay(&args) {
      return Ok(Invocation {
        output,
        status: NodeStatus::Cached,
      });
    }
    let output = self.record(args)?;
    Ok(Invocation {
      output,
      status: NodeStatus::Run,
    })
  }

  fn replay(&self, args: &A) -> Option<T> {
    let checkpoint = self.manager.replayable_checkpoint(&self.node_id)?;
    let output = match serde_json::from_value::<T>(checkpoint.output.clone()) {
      Ok(o) => o,
      Err(e) => {
        warn!(
          node_id = %self.node_id,
          error = %e,
          "stored output does not decode; running node again"
        );
        return None;
      }
    };
    let restored = match (&checkpoint.shared_store_state, self.shared_store(args)) {
      (Some(snapshot), Some(store)) => {
        store.restore(snapshot);
        true
      }
      _ => false,
    };
    debug!(
      node_id = %self.node_id,
      status = %NodeStatus::Cached,
      restored,
      "replayed checkpoint"
    );
    Some(output)
  }

  fn record(&self, args: A) -> Result<T, E> {
    let store = self.shared_store(&args);
    let inputs = capture_inputs(&args);
    let stopwatch = CpuStopwatch::start();
    let output = (self.func)(args)?;
    let execution_time = stopwatch.elapsed_secs();
    let snapshot = store.map(|s| s.snapshot());

    let session_id = self.manager.session_id();
    let checkpoint = match serde_json::to_value(&output) {
      Ok(value) => Checkpoint::new(session_id, inputs, value, execution_time),
      Err(e) => {
        warn!(
          node_id = %self.node_id,
          error = %e,
          "output not serializable; checkpoint will not replay"
        );
        Checkpoint::new(session_id, inputs, Value::Null, execution_time)
          .with_error(format!("output not serializable: {e}"))
      }
    };
    self
      .manager
      .append_checkpoint(&self.node_id, checkpoint.with_shared_store_state(snapshot));
    Ok(output)
  }

  fn shared_store(&self, args: &A) -> Option<SharedStore> {
    self.extract.as_ref().and_then(|extract| extract(args))
  }
}
