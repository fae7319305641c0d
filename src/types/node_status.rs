//! Whether a node result came from a real execution or from a checkpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a node produced its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
  /// The wrapped callable was executed.
  Run,
  /// The result was replayed from a stored checkpoint.
  Cached,
}

impl fmt::Display for NodeStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NodeStatus::Run => write!(f, "run"),
      NodeStatus::Cached => write!(f, "cached"),
    }
  }
}
