//! State document save/load (JSON).

use crate::codec::{self, StateDocument};
use crate::error::ReplayError;
use std::path::Path;
use tracing::instrument;

/// Default filename for a persisted session.
pub const STATE_FILENAME: &str = "replay_state.json";

/// Saves `doc` to `path` as JSON, creating the parent directory if needed.
#[instrument(level = "trace", skip(path, doc), fields(path = %path.display()))]
pub fn save_state(path: &Path, doc: &StateDocument) -> Result<(), ReplayError> {
  let json = codec::encode(doc)?;
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}

/// Loads a document from `path`. `Io` if the file cannot be read, `Format` if
/// its content is not a valid state document.
#[instrument(level = "trace", skip(path), fields(path = %path.display()))]
pub fn load_state(path: &Path) -> Result<StateDocument, ReplayError> {
  let text = std::fs::read_to_string(path)?;
  codec::decode(&text)
}
