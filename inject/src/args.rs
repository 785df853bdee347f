//! Positional and named arguments handed to handlers.

use crate::core::Value;
use crate::error::{InjectError, Result};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The arguments a handler is called with.
///
/// Named arguments map a parameter name to an optional value. A binding
/// installs every declared key, so a key that resolved to nothing is still
/// present, as `None`.
#[derive(Clone, Default)]
pub struct Args {
  positional: Vec<Value>,
  named: HashMap<String, Option<Value>>,
}

impl Args {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends a positional argument.
  pub fn with_positional<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.push(Arc::new(value));
    self
  }

  /// Adds a named argument.
  pub fn with_named<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
    self.insert_named(name, Some(Arc::new(value)));
    self
  }

  pub fn push(&mut self, value: Value) {
    self.positional.push(value);
  }

  pub fn positional(&self) -> &[Value] {
    &self.positional
  }

  pub fn positional_as<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
    self
      .positional
      .get(index)
      .and_then(|value| Arc::clone(value).downcast::<T>().ok())
  }

  /// Installs a named argument, returning the previous one if the name was bound.
  pub fn insert_named(&mut self, name: impl Into<String>, value: Option<Value>) -> Option<Option<Value>> {
    self.named.insert(name.into(), value)
  }

  /// The raw named argument: `None` if the name is unbound, `Some(None)` if
  /// it is bound to no value.
  pub fn named(&self, name: &str) -> Option<&Option<Value>> {
    self.named.get(name)
  }

  /// Returns `true` if `name` is bound, even to no value.
  pub fn is_bound(&self, name: &str) -> bool {
    self.named.contains_key(name)
  }

  /// Returns the named argument downcast to `T`, or `None` if it is
  /// missing, bound to no value, or of another type.
  pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
    self
      .named
      .get(name)
      .and_then(Option::as_ref)
      .and_then(|value| Arc::clone(value).downcast::<T>().ok())
  }

  /// Like [`Args::get`], but says why the argument is not usable.
  pub fn require<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    let value = self
      .named
      .get(name)
      .and_then(Option::as_ref)
      .ok_or_else(|| InjectError::Unresolved {
        name: name.to_owned(),
      })?;
    Arc::clone(value)
      .downcast::<T>()
      .map_err(|_| InjectError::TypeMismatch {
        name: name.to_owned(),
        expected: type_name::<T>(),
      })
  }

  /// Bound parameter names, in no particular order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.named.keys().map(String::as_str)
  }
}

impl fmt::Debug for Args {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut named: Vec<(&str, &str)> = self
      .named
      .iter()
      .map(|(name, value)| {
        let state = if value.is_some() { "bound" } else { "none" };
        (name.as_str(), state)
      })
      .collect();
    named.sort_unstable();
    f.debug_struct("Args")
      .field("positional", &self.positional.len())
      .field("named", &named)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_require_distinguishes_missing_from_mismatched() {
    let mut args = Args::new().with_named("version", "v1.0".to_string());
    args.insert_named("mysql", None);

    assert_eq!(*args.require::<String>("version").unwrap(), "v1.0");
    assert_eq!(
      args.require::<String>("mysql").unwrap_err(),
      InjectError::Unresolved {
        name: "mysql".to_string()
      }
    );
    assert!(matches!(
      args.require::<u32>("version"),
      Err(InjectError::TypeMismatch { .. })
    ));
  }

  #[test]
  fn test_bound_to_none_is_still_bound() {
    let mut args = Args::new();
    args.insert_named("mysql", None);

    assert!(args.is_bound("mysql"));
    assert!(args.get::<String>("mysql").is_none());
    assert!(!args.is_bound("redis"));
  }

  #[test]
  fn test_positional_arguments_keep_order() {
    let args = Args::new().with_positional(1u8).with_positional("two");

    assert_eq!(args.positional().len(), 2);
    assert_eq!(*args.positional_as::<u8>(0).unwrap(), 1);
    assert_eq!(*args.positional_as::<&str>(1).unwrap(), "two");
    assert!(args.positional_as::<u8>(2).is_none());
  }

  #[test]
  fn test_names_include_unresolved_bindings() {
    let mut args = Args::new().with_named("version", "v1.0");
    args.insert_named("mysql", None);

    let mut names: Vec<&str> = args.names().collect();
    names.sort_unstable();

    assert_eq!(names, vec!["mysql", "version"]);
  }
}
