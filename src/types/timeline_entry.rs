//! One row of a session's chronological checkpoint view.

use serde::Serialize;
use std::sync::Arc;

use super::{Checkpoint, NodeId};

/// A checkpoint placed on the session timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
  /// Node the checkpoint belongs to.
  pub node_id: NodeId,
  /// 0-based position in that node's history.
  pub attempt: usize,
  pub checkpoint: Arc<Checkpoint>,
}
