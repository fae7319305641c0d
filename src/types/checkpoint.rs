//! Record of one execution attempt of a node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{NodeStatus, StoreMap};
use crate::capture::UNSERIALIZABLE_FLAG;

/// Record of one execution attempt of a node.
///
/// Built once and then shared behind an `Arc`; nothing mutates a checkpoint
/// after it has been appended to a history.
///
/// `error` and `shared_store_state` are always written (as `null` when absent)
/// and must be present when decoding; `null` and `{}` are different states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
  /// Session that produced this attempt.
  pub session_id: i64,
  /// Captured arguments.
  pub inputs: Value,
  /// Serialized return value.
  pub output: Value,
  /// CPU time spent in the callable, in seconds.
  pub execution_time: f64,
  /// Unix time when the checkpoint was created, in seconds.
  pub timestamp: f64,
  pub status: NodeStatus,
  /// Set when the attempt produced something that must not be replayed.
  #[serde(deserialize_with = "Option::deserialize")]
  pub error: Option<String>,
  /// Deep copy of the shared store after the call, if one was captured.
  #[serde(deserialize_with = "Option::deserialize")]
  pub shared_store_state: Option<StoreMap>,
}

impl Checkpoint {
  /// New `Run` checkpoint stamped with the current time.
  pub fn new(session_id: i64, inputs: Value, output: Value, execution_time: f64) -> Self {
    Self {
      session_id,
      inputs,
      output,
      execution_time,
      timestamp: now_unix_seconds(),
      status: NodeStatus::Run,
      error: None,
      shared_store_state: None,
    }
  }

  pub fn with_status(mut self, status: NodeStatus) -> Self {
    self.status = status;
    self
  }

  pub fn with_error(mut self, error: impl Into<String>) -> Self {
    self.error = Some(error.into());
    self
  }

  pub fn with_shared_store_state(mut self, state: Option<StoreMap>) -> Self {
    self.shared_store_state = state;
    self
  }

  pub fn is_error(&self) -> bool {
    self.error.is_some()
  }

  /// True if any part of `inputs` was captured through the opaque fallback,
  /// i.e. holds an object with both `repr` and `"unserializable": true`.
  pub fn has_opaque_inputs(&self) -> bool {
    contains_flag(&self.inputs)
  }
}

fn contains_flag(v: &Value) -> bool {
  match v {
    Value::Object(map) => {
      (map.get(UNSERIALIZABLE_FLAG) == Some(&Value::Bool(true)) && map.contains_key("repr"))
        || map.values().any(contains_flag)
    }
    Value::Array(items) => items.iter().any(contains_flag),
    _ => false,
  }
}

/// Current unix time in seconds with microsecond precision.
pub fn now_unix_seconds() -> f64 {
  chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
