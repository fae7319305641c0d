//! Replay mode selection.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable read by [ReplayMode::from_env].
pub const ENV_REPLAY_MODE: &str = "STREAMWEAVE_REPLAY_MODE";

/// How instrumented nodes treat existing checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayMode {
  /// Replay the latest checkpoint when one exists, otherwise record.
  #[default]
  Replay,
  /// Always execute and record, never replay.
  RecordOnly,
  /// Call through without recording anything.
  Passthrough,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown replay mode '{0}' (expected replay, record or off)")]
pub struct ParseModeError(pub String);

impl FromStr for ReplayMode {
  type Err = ParseModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "replay" => Ok(ReplayMode::Replay),
      "record" | "record_only" | "record-only" => Ok(ReplayMode::RecordOnly),
      "off" | "passthrough" => Ok(ReplayMode::Passthrough),
      _ => Err(ParseModeError(s.to_string())),
    }
  }
}

impl fmt::Display for ReplayMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReplayMode::Replay => write!(f, "replay"),
      ReplayMode::RecordOnly => write!(f, "record"),
      ReplayMode::Passthrough => write!(f, "off"),
    }
  }
}

impl ReplayMode {
  /// Reads [ENV_REPLAY_MODE]; unset or unparsable values give the default.
  pub fn from_env() -> Self {
    match std::env::var(ENV_REPLAY_MODE) {
      Ok(raw) => raw.parse().unwrap_or_else(|e: ParseModeError| {
        tracing::warn!(error = %e, "ignoring {}", ENV_REPLAY_MODE);
        ReplayMode::default()
      }),
      Err(_) => ReplayMode::default(),
    }
  }

  pub fn replays(&self) -> bool {
    matches!(self, ReplayMode::Replay)
  }

  pub fn records(&self) -> bool {
    !matches!(self, ReplayMode::Passthrough)
  }
}
