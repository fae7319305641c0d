//! Errors surfaced by the state manager and its persistence layer.

use thiserror::Error;

/// Errors returned by import, export and file persistence.
///
/// Failures of instrumented callables are never wrapped here; they reach the
/// caller as the callable's own error type.
#[derive(Debug, Error)]
pub enum ReplayError {
  /// Reading or writing the state file failed.
  #[error("state file I/O failed: {0}")]
  Io(#[from] std::io::Error),

  /// The state document is structurally invalid.
  #[error("malformed state document: {0}")]
  Format(String),
}

impl From<serde_json::Error> for ReplayError {
  fn from(e: serde_json::Error) -> Self {
    ReplayError::Format(e.to_string())
  }
}
