//! Process-wide default state manager for callers that do not pass one.
//!
//! Library code should take an `Arc<StateManager>` explicitly; this module is
//! for the outermost layer of an application (a `main`, a script) where a single
//! session per process is all that is needed.

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::config::ReplayMode;
use crate::recordable::Recordable;
use crate::state_manager::StateManager;
use crate::types::NodeId;

static DEFAULT_MANAGER: Lazy<Arc<StateManager>> = Lazy::new(|| {
  let mode = ReplayMode::from_env();
  let manager = StateManager::new().with_mode(mode);
  tracing::debug!(
    session_id = manager.session_id(),
    mode = %mode,
    "default state manager created"
  );
  Arc::new(manager)
});

/// The default manager, created on first use with its mode read from the
/// environment.
pub fn default_manager() -> Arc<StateManager> {
  Arc::clone(&DEFAULT_MANAGER)
}

/// Wraps `func` against the default manager.
pub fn recordable<F, A>(node_id: impl Into<NodeId>, func: F) -> Recordable<F, A> {
  Recordable::new(default_manager(), node_id, func)
}
