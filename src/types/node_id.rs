//! Stable identity of an instrumented node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between scope and name in a qualified id.
pub const SCOPE_SEPARATOR: &str = "::";

/// Stable key naming an instrumented callable.
///
/// Two wrappers built with the same id share one history, so the id must be
/// identical across repeated calls to the same logical step and distinct for
/// same-named steps living in different scopes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  /// Builds `scope::name`. An empty scope yields just `name`.
  pub fn qualified(scope: &str, name: &str) -> Self {
    if scope.is_empty() {
      return Self(name.to_string());
    }
    Self(format!("{scope}{SCOPE_SEPARATOR}{name}"))
  }

  /// Derives the id from the fully qualified type name of `f`.
  ///
  /// For a function item this is its module path plus name, e.g.
  /// `my_app::steps::fetch_user`. Closures all resolve to their enclosing
  /// function followed by `{{closure}}`, so give closures an explicit id.
  pub fn of_fn<F>(_f: &F) -> Self {
    Self(std::any::type_name::<F>().to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The last path segment.
  pub fn name(&self) -> &str {
    self
      .0
      .rsplit(SCOPE_SEPARATOR)
      .next()
      .unwrap_or(self.0.as_str())
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.pad(&self.0)
  }
}

impl From<&str> for NodeId {
  fn from(s: &str) -> Self {
    Self::new(s)
  }
}

impl From<String> for NodeId {
  fn from(s: String) -> Self {
    Self(s)
  }
}

impl From<&NodeId> for NodeId {
  fn from(id: &NodeId) -> Self {
    id.clone()
  }
}

impl AsRef<str> for NodeId {
  fn as_ref(&self) -> &str {
    &self.0
  }
}
