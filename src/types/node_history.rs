//! Append-only checkpoint history of one node.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Checkpoint, NodeId};

/// Chronological, append-only list of checkpoints for one [NodeId].
///
/// The state manager owns the live histories; anything handed out is a clone
/// that shares the same immutable checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeHistory {
  pub id: NodeId,
  pub checkpoints: Vec<Arc<Checkpoint>>,
}

impl NodeHistory {
  pub fn new(id: NodeId) -> Self {
    Self {
      id,
      checkpoints: Vec::new(),
    }
  }

  pub(crate) fn push(&mut self, checkpoint: Arc<Checkpoint>) {
    self.checkpoints.push(checkpoint);
  }

  /// The last appended checkpoint.
  pub fn latest(&self) -> Option<&Arc<Checkpoint>> {
    self.checkpoints.last()
  }

  pub fn len(&self) -> usize {
    self.checkpoints.len()
  }

  pub fn is_empty(&self) -> bool {
    self.checkpoints.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Arc<Checkpoint>> {
    self.checkpoints.iter()
  }

  /// Total CPU seconds across all attempts.
  pub fn total_execution_time(&self) -> f64 {
    self.checkpoints.iter().map(|c| c.execution_time).sum()
  }
}
