//! Mutable key-value store handed between workflow steps.

use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

/// Insertion-ordered mapping held by a [SharedStore] and captured in checkpoints.
pub type StoreMap = serde_json::Map<String, Value>;

/// Cloneable handle to a shared, mutable [StoreMap].
///
/// Clones point at the same map, so a step that mutates its copy of the handle
/// is visible to the caller. This is what lets replay restore side effects in
/// place.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
  inner: Arc<Mutex<StoreMap>>,
}

impl SharedStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_map(map: StoreMap) -> Self {
    Self {
      inner: Arc::new(Mutex::new(map)),
    }
  }

  pub fn get(&self, key: &str) -> Option<Value> {
    self.inner.lock().get(key).cloned()
  }

  pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.inner.lock().insert(key.into(), value.into())
  }

  pub fn remove(&self, key: &str) -> Option<Value> {
    self.inner.lock().remove(key)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.inner.lock().contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.inner.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.lock().is_empty()
  }

  /// Deep copy of the current contents.
  pub fn snapshot(&self) -> StoreMap {
    self.inner.lock().clone()
  }

  /// Clears the store and repopulates it from `snapshot`.
  pub fn restore(&self, snapshot: &StoreMap) {
    let mut map = self.inner.lock();
    map.clear();
    map.extend(snapshot.iter().map(|(k, v)| (k.clone(), v.clone())));
  }

  /// Runs `f` with exclusive access to the map.
  pub fn with<R>(&self, f: impl FnOnce(&mut StoreMap) -> R) -> R {
    f(&mut self.inner.lock())
  }

  /// True if both handles point at the same underlying map.
  pub fn ptr_eq(&self, other: &SharedStore) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl From<StoreMap> for SharedStore {
  fn from(map: StoreMap) -> Self {
    Self::from_map(map)
  }
}

impl Serialize for SharedStore {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.inner.lock().serialize(serializer)
  }
}
