//! Capturing call arguments into checkpoint inputs.
//!
//! Arguments are captured through `Serialize`. Values that have no faithful
//! serialized form (open files, sockets, channels) are wrapped in [Opaque],
//! which records their `Debug` text and tags it as unserializable. If
//! serialization still fails at runtime the whole argument set degrades to a
//! tagged fallback instead of aborting the call.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Key marking a captured value as a lossy stand-in.
pub const UNSERIALIZABLE_FLAG: &str = "unserializable";

/// Wraps a value that cannot be captured verbatim.
///
/// Serializes as `{"repr": "<Debug text>", "unserializable": true}`.
pub struct Opaque<T>(pub T);

impl<T> Opaque<T> {
  pub fn into_inner(self) -> T {
    self.0
  }
}

impl<T> Deref for Opaque<T> {
  type Target = T;

  fn deref(&self) -> &T {
    &self.0
  }
}

impl<T> DerefMut for Opaque<T> {
  fn deref_mut(&mut self) -> &mut T {
    &mut self.0
  }
}

impl<T: fmt::Debug> fmt::Debug for Opaque<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Opaque").field(&self.0).finish()
  }
}

impl<T: fmt::Debug> Serialize for Opaque<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("repr", &format!("{:?}", self.0))?;
    map.serialize_entry(UNSERIALIZABLE_FLAG, &true)?;
    map.end()
  }
}

/// Serializes `args` for a checkpoint, falling back to a tagged description.
///
/// The fallback keeps only the argument type name and the serializer error;
/// the argument values themselves are lost. Wrap values known not to serialize
/// in [Opaque] to keep their `Debug` text instead.
pub fn capture_inputs<A: Serialize + ?Sized>(args: &A) -> Value {
  match serde_json::to_value(args) {
    Ok(v) => v,
    Err(e) => {
      let type_name = std::any::type_name::<A>();
      warn!(error = %e, args_type = type_name, "inputs not serializable; storing fallback");
      fallback(type_name, &e.to_string())
    }
  }
}

fn fallback(repr: &str, reason: &str) -> Value {
  json!({
    "repr": repr,
    "reason": reason,
    UNSERIALIZABLE_FLAG: true,
  })
}
