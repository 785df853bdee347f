//! The `Injector` struct and its associated methods.

use crate::args::Args;
use crate::core::{validate_key, Entry, InjectorInner, Value};
use crate::error::{InjectError, Result};
use crate::key::KeySpec;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// A scoped key-value store with an optional parent for fallback lookup.
///
/// `Injector` is a cheap handle: clones share the same entries. Entries are
/// held in a concurrent map, so a root injector can be read and written from
/// many request threads at once.
///
/// The parent is held weakly. A child never keeps its parent alive, and a
/// lookup that reaches a parent which has already been dropped yields `None`.
#[derive(Clone)]
pub struct Injector {
  inner: Arc<InjectorInner>,
}

/// A non-owning handle to an [`Injector`].
#[derive(Clone)]
pub struct WeakInjector {
  inner: Weak<InjectorInner>,
}

impl WeakInjector {
  /// Returns the injector if it is still alive.
  pub fn upgrade(&self) -> Option<Injector> {
    self.inner.upgrade().map(Injector::from_inner)
  }
}

impl Default for Injector {
  fn default() -> Self {
    Self::new()
  }
}

impl Injector {
  /// Creates a new root injector with no parent.
  pub fn new() -> Self {
    Self::from_inner(Arc::new(InjectorInner::new(None)))
  }

  /// Creates an injector that falls back to `parent` on a local miss.
  pub fn child_of(parent: &Injector) -> Self {
    Self::from_inner(Arc::new(InjectorInner::new(Some(&parent.inner))))
  }

  /// Creates a child of the injector behind `parent`.
  ///
  /// Fails with [`InjectError::InvalidParent`] if that injector has already
  /// been dropped.
  pub fn with_weak_parent(parent: &WeakInjector) -> Result<Self> {
    let parent = parent.upgrade().ok_or(InjectError::InvalidParent)?;
    Ok(Self::child_of(&parent))
  }

  pub(crate) fn from_inner(inner: Arc<InjectorInner>) -> Self {
    Self { inner }
  }

  pub fn downgrade(&self) -> WeakInjector {
    WeakInjector {
      inner: Arc::downgrade(&self.inner),
    }
  }

  /// Returns the parent injector, if there is one and it is still alive.
  pub fn parent(&self) -> Option<Injector> {
    self
      .inner
      .parent
      .as_ref()
      .and_then(Weak::upgrade)
      .map(Injector::from_inner)
  }

  /// Distance from the root of the chain. A root injector has depth 0.
  pub fn depth(&self) -> usize {
    self.inner.depth
  }

  /// Returns `true` if both handles refer to the same injector.
  pub fn ptr_eq(&self, other: &Injector) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }

  // --- Mapping ---

  /// Merges `entries` into the local store, overwriting existing keys.
  ///
  /// All keys are validated before anything is written, so a failing call
  /// leaves the injector unchanged.
  pub fn map<I, K>(&self, entries: I) -> Result<&Self>
  where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
  {
    let staged: Vec<(String, Value)> = entries
      .into_iter()
      .map(|(key, value)| (key.into(), value))
      .collect();
    for (key, _) in &staged {
      validate_key(key)?;
    }
    for (key, value) in staged {
      tracing::trace!(injector = self.inner.id, %key, "mapped");
      self.inner.entries.insert(key, Entry::Value(value));
    }
    Ok(self)
  }

  /// Maps a single value under `key`.
  ///
  /// `value` is wrapped in an `Arc`; use [`Injector::map`] to store an
  /// already shared [`Value`].
  pub fn insert<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) -> Result<&Self> {
    self.map([(key.into(), Arc::new(value) as Value)])
  }

  /// Maps `key` to "no value".
  ///
  /// The key is considered present locally, so lookups stop here and do not
  /// fall through to the parent.
  pub fn map_null(&self, key: impl Into<String>) -> Result<&Self> {
    let key = key.into();
    validate_key(&key)?;
    tracing::trace!(injector = self.inner.id, %key, "mapped null");
    self.inner.entries.insert(key, Entry::Null);
    Ok(self)
  }

  /// Maps this injector itself under `key`, so handlers can request the
  /// current injector by name.
  pub fn bind_self(&self, key: impl Into<String>) -> Result<&Self> {
    let key = key.into();
    validate_key(&key)?;
    self
      .inner
      .entries
      .insert(key, Entry::Reflexive(Arc::downgrade(&self.inner)));
    Ok(self)
  }

  /// Removes a local entry. Returns `true` if one was present.
  pub fn remove(&self, key: &str) -> bool {
    self.inner.entries.remove(key).is_some()
  }

  // --- Lookup ---

  /// Looks `key` up locally and then along the parent chain.
  ///
  /// Presence is decided by key existence: a key mapped with
  /// [`Injector::map_null`] yields `None` without consulting the parent.
  /// A miss at the top of the chain yields `None`.
  pub fn get(&self, key: &str) -> Option<Value> {
    let mut current = Arc::clone(&self.inner);
    loop {
      let next = match current.entries.get(key) {
        Some(entry) => {
          tracing::trace!(injector = current.id, key, "resolved");
          return entry.resolve();
        }
        None => current.parent.as_ref().map(Weak::upgrade),
      };
      match next {
        None => {
          tracing::trace!(injector = self.inner.id, key, "not found");
          return None;
        }
        Some(None) => {
          tracing::warn!(
            injector = current.id,
            key,
            "parent injector dropped before lookup"
          );
          return None;
        }
        Some(Some(parent)) => current = parent,
      }
    }
  }

  /// Looks `key` up and downcasts the value to `T`.
  ///
  /// Returns `None` if the key is absent or holds a value of another type.
  pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
    self.get(key).and_then(|value| value.downcast::<T>().ok())
  }

  /// Returns `true` if `key` is present in the local store, ignoring parents.
  pub fn contains_local(&self, key: &str) -> bool {
    self.inner.entries.contains_key(key)
  }

  /// Local keys, in no particular order.
  pub fn keys(&self) -> Vec<String> {
    self
      .inner
      .entries
      .iter()
      .map(|entry| entry.key().clone())
      .collect()
  }

  pub fn len(&self) -> usize {
    self.inner.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.entries.is_empty()
  }

  // --- Apply ---

  /// Resolves every key specifier in `keys`, installs the values into
  /// `args` under their bind names and calls `target` with the result.
  ///
  /// All specifiers are parsed before anything is resolved; an invalid one
  /// fails with [`InjectError::InvalidKey`] and `target` is not called.
  pub fn apply<I, S, F, R>(&self, keys: I, target: F, args: Args) -> Result<R>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnOnce(Args) -> R,
  {
    let specs = keys
      .into_iter()
      .map(|key| KeySpec::parse(key.as_ref()))
      .collect::<Result<Vec<_>>>()?;
    Ok(self.apply_specs(&specs, target, args))
  }

  /// Like [`Injector::apply`], with specifiers that are already parsed.
  ///
  /// A key that resolves to nothing is still installed, as `None`.
  pub fn apply_specs<F, R>(&self, specs: &[KeySpec], target: F, mut args: Args) -> R
  where
    F: FnOnce(Args) -> R,
  {
    for spec in specs {
      let value = self.get(spec.lookup());
      tracing::trace!(
        injector = self.inner.id,
        lookup = spec.lookup(),
        bind = spec.bind_name(),
        found = value.is_some(),
        "injecting"
      );
      args.insert_named(spec.bind_name(), value);
    }
    target(args)
  }
}

impl fmt::Debug for Injector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Injector")
      .field("id", &self.inner.id)
      .field("depth", &self.inner.depth)
      .field("entries", &self.inner.entries.len())
      .finish()
  }
}

impl fmt::Debug for WeakInjector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WeakInjector")
      .field("alive", &(self.inner.strong_count() > 0))
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_get_walks_deeper_chains() {
    let root = Injector::new();
    let middle = Injector::child_of(&root);
    let leaf = Injector::child_of(&middle);
    root.insert("version", "v1.0").unwrap();

    assert_eq!(leaf.depth(), 2);
    assert_eq!(*leaf.get_as::<&str>("version").unwrap(), "v1.0");
  }

  #[test]
  fn test_get_as_wrong_type_is_none() {
    let injector = Injector::new();
    injector.insert("port", 8080u16).unwrap();

    assert!(injector.get_as::<String>("port").is_none());
    assert_eq!(*injector.get_as::<u16>("port").unwrap(), 8080);
  }

  #[test]
  fn test_remove_uncovers_parent_value() {
    let root = Injector::new();
    let child = Injector::child_of(&root);
    root.insert("mode", "root").unwrap();
    child.insert("mode", "child").unwrap();

    assert!(child.remove("mode"));
    assert!(!child.remove("mode"));
    assert_eq!(*child.get_as::<&str>("mode").unwrap(), "root");
  }

  #[test]
  fn test_bind_self_resolves_to_same_injector() {
    let injector = Injector::new();
    injector.bind_self("injector").unwrap();

    let resolved = injector.get_as::<Injector>("injector").unwrap();
    assert!(resolved.ptr_eq(&injector));
  }

  #[test]
  fn test_keys_lists_only_local_entries() {
    let root = Injector::new();
    let child = Injector::child_of(&root);
    root.insert("version", "v1.0").unwrap();
    child.insert("mysql", "connX").unwrap();
    child.map_null("cache").unwrap();

    let mut keys = child.keys();
    keys.sort();

    assert_eq!(keys, vec![String::from("cache"), String::from("mysql")]);
    assert_eq!(root.keys(), vec![String::from("version")]);
  }
}
