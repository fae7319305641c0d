//! JSON encoding of the full state manager.
//!
//! Layout:
//!
//! ```json
//! {
//!   "session_id": 1718000000,
//!   "nodes": [
//!     { "id": "steps::fetch_user", "checkpoints": [ { "session_id": ..., "status": "run", ... } ] }
//!   ]
//! }
//! ```
//!
//! Every key is required on decode. Optional checkpoint fields are written as
//! `null` rather than omitted so that "absent" survives a round trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::ReplayError;
use crate::types::NodeHistory;

/// Serialized form of a state manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
  pub session_id: i64,
  pub nodes: Vec<NodeHistory>,
}

impl StateDocument {
  /// Rejects documents that decode but cannot be imported as-is.
  pub fn validate(&self) -> Result<(), ReplayError> {
    let mut seen = HashSet::new();
    for node in &self.nodes {
      if node.id.is_empty() {
        return Err(ReplayError::Format("node with empty id".to_string()));
      }
      if !seen.insert(&node.id) {
        return Err(ReplayError::Format(format!("duplicate node id '{}'", node.id)));
      }
      if let Some(bad) = node
        .checkpoints
        .iter()
        .find(|c| !c.execution_time.is_finite() || !c.timestamp.is_finite())
      {
        return Err(ReplayError::Format(format!(
          "node '{}' has a non-finite time field (execution_time={}, timestamp={})",
          node.id, bad.execution_time, bad.timestamp
        )));
      }
    }
    Ok(())
  }

  pub fn checkpoint_count(&self) -> usize {
    self.nodes.iter().map(NodeHistory::len).sum()
  }
}

/// Encodes `doc` as pretty-printed JSON.
///
/// Validates first: JSON has no NaN or infinity, so a non-finite time would be
/// written as `null` and the file could never be decoded again.
pub fn encode(doc: &StateDocument) -> Result<String, ReplayError> {
  doc.validate()?;
  Ok(serde_json::to_string_pretty(doc)?)
}

/// Decodes and validates a document from JSON text.
pub fn decode(text: &str) -> Result<StateDocument, ReplayError> {
  let doc: StateDocument = serde_json::from_str(text)?;
  doc.validate()?;
  Ok(doc)
}

/// Decodes and validates a document from an already-parsed JSON value.
pub fn decode_value(value: Value) -> Result<StateDocument, ReplayError> {
  let doc: StateDocument = serde_json::from_value(value)?;
  doc.validate()?;
  Ok(doc)
}
