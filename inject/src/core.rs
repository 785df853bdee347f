//! Core, non-public data structures shared by injectors.

use crate::error::{InjectError, Result};
use crate::injector::Injector;
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// A value stored in an injector.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Separates the lookup key from the bind name in a key specifier.
pub(crate) const SEPARATOR: char = ':';

static NEXT_INJECTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Checks the invariants every mapped key has to satisfy.
///
/// A key containing the separator could never be addressed by a key
/// specifier, so it is rejected at mapping time.
pub(crate) fn validate_key(key: &str) -> Result<()> {
  if key.is_empty() {
    return Err(InjectError::invalid_key(key, "key must not be empty"));
  }
  if key.contains(SEPARATOR) {
    return Err(InjectError::invalid_key(key, "key must not contain ':'"));
  }
  Ok(())
}

pub(crate) enum Entry {
  Value(Value),
  /// Mapped to "no value". Shadows the parent chain.
  Null,
  /// The owning injector itself. Held weakly so an injector never keeps
  /// itself alive through its own entries.
  Reflexive(Weak<InjectorInner>),
}

impl Entry {
  pub(crate) fn resolve(&self) -> Option<Value> {
    match self {
      Entry::Value(value) => Some(Arc::clone(value)),
      Entry::Null => None,
      Entry::Reflexive(weak) => weak
        .upgrade()
        .map(|inner| Arc::new(Injector::from_inner(inner)) as Value),
    }
  }
}

impl fmt::Debug for Entry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Entry::Value(_) => write!(f, "Value(..)"),
      Entry::Null => write!(f, "Null"),
      Entry::Reflexive(_) => write!(f, "Reflexive"),
    }
  }
}

pub(crate) struct InjectorInner {
  pub(crate) id: u64,
  pub(crate) depth: usize,
  pub(crate) entries: DashMap<String, Entry>,
  pub(crate) parent: Option<Weak<InjectorInner>>,
}

impl InjectorInner {
  pub(crate) fn new(parent: Option<&Arc<InjectorInner>>) -> Self {
    let id = NEXT_INJECTOR_ID.fetch_add(1, Ordering::Relaxed);
    let depth = parent.map_or(0, |p| p.depth + 1);
    tracing::debug!(injector = id, depth, "created injector");
    Self {
      id,
      depth,
      entries: DashMap::new(),
      parent: parent.map(Arc::downgrade),
    }
  }
}

impl Drop for InjectorInner {
  fn drop(&mut self) {
    tracing::debug!(
      injector = self.id,
      depth = self.depth,
      entries = self.entries.len(),
      "discarding injector"
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validate_key_rules() {
    assert!(validate_key("mysql").is_ok());
    assert!(validate_key("db.primary").is_ok());
    assert!(matches!(
      validate_key(""),
      Err(InjectError::InvalidKey { .. })
    ));
    assert!(matches!(
      validate_key("a:b"),
      Err(InjectError::InvalidKey { .. })
    ));
  }

  #[test]
  fn test_reflexive_entry_does_not_keep_injector_alive() {
    let inner = Arc::new(InjectorInner::new(None));
    let entry = Entry::Reflexive(Arc::downgrade(&inner));
    assert!(entry.resolve().is_some());

    drop(inner);
    assert!(entry.resolve().is_none());
  }
}
