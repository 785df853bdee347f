//! Public macros for building injector entries.

/// Builds a list of `(String, Value)` pairs for [`Injector::map`].
///
/// Each value is wrapped in an `Arc` and stored as a type-erased [`Value`].
///
/// [`Injector::map`]: crate::Injector::map
/// [`Value`]: crate::Value
///
/// # Examples
///
/// ```
/// use fibre_inject::{entries, Injector};
///
/// let injector = Injector::new();
/// injector
///   .map(entries! {
///     "version" => "v1.0",
///     "max_connections" => 16u32,
///   })
///   .unwrap();
///
/// assert_eq!(*injector.get_as::<u32>("max_connections").unwrap(), 16);
/// ```
#[macro_export]
macro_rules! entries {
  () => {
    ::std::vec::Vec::<(::std::string::String, $crate::Value)>::new()
  };
  ($($key:expr => $value:expr),+ $(,)?) => {
    ::std::vec![
      $(
        (
          ::std::string::String::from($key),
          ::std::sync::Arc::new($value) as $crate::Value,
        )
      ),+
    ]
  };
}

#[cfg(test)]
mod tests {
  use crate::Injector;

  #[test]
  fn test_entries_macro_maps_mixed_types() {
    let injector = Injector::new();
    injector
      .map(entries! { "name" => String::from("fibre"), "port" => 8080u16 })
      .unwrap();

    assert_eq!(*injector.get_as::<String>("name").unwrap(), "fibre");
    assert_eq!(*injector.get_as::<u16>("port").unwrap(), 8080);
  }

  #[test]
  fn test_empty_entries_macro_is_a_no_op() {
    let injector = Injector::new();
    injector.map(entries! {}).unwrap();
    assert!(injector.is_empty());
  }
}
