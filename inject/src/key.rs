use crate::core::SEPARATOR;
use crate::error::{InjectError, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed key specifier: `"lookup"` or `"lookup:bind"`.
///
/// The lookup half names the injector entry, the bind half names the
/// parameter the value is handed to. Without a bind half the lookup key is
/// used for both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySpec {
  lookup: String,
  bind: Option<String>,
}

impl KeySpec {
  pub fn parse(spec: &str) -> Result<Self> {
    let mut parts = spec.split(SEPARATOR);
    let lookup = parts.next().unwrap_or_default();
    let bind = parts.next();
    if parts.next().is_some() {
      return Err(InjectError::invalid_key(
        spec,
        "key shall contain at most one ':'",
      ));
    }
    if lookup.is_empty() {
      return Err(InjectError::invalid_key(spec, "lookup key must not be empty"));
    }
    if bind.is_some_and(str::is_empty) {
      return Err(InjectError::invalid_key(spec, "bind name must not be empty"));
    }
    Ok(Self {
      lookup: lookup.to_owned(),
      bind: bind.map(str::to_owned),
    })
  }

  pub fn lookup(&self) -> &str {
    &self.lookup
  }

  /// The parameter name the resolved value is installed under.
  pub fn bind_name(&self) -> &str {
    self.bind.as_deref().unwrap_or(&self.lookup)
  }

  pub fn is_aliased(&self) -> bool {
    self.bind.is_some()
  }
}

impl FromStr for KeySpec {
  type Err = InjectError;

  fn from_str(s: &str) -> Result<Self> {
    Self::parse(s)
  }
}

impl fmt::Display for KeySpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.bind {
      Some(bind) => write!(f, "{}{}{}", self.lookup, SEPARATOR, bind),
      None => f.write_str(&self.lookup),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_plain_key_binds_under_its_own_name() {
    let spec = KeySpec::parse("mysql").unwrap();
    assert_eq!(spec.lookup(), "mysql");
    assert_eq!(spec.bind_name(), "mysql");
    assert!(!spec.is_aliased());
  }

  #[test]
  fn test_aliased_key_splits_lookup_and_bind() {
    let spec: KeySpec = "mysql:db".parse().unwrap();
    assert_eq!(spec.lookup(), "mysql");
    assert_eq!(spec.bind_name(), "db");
    assert!(spec.is_aliased());
    assert_eq!(spec.to_string(), "mysql:db");
  }

  #[test]
  fn test_two_separators_are_rejected() {
    let err = KeySpec::parse("a:b:c").unwrap_err();
    assert_eq!(
      err,
      InjectError::InvalidKey {
        key: "a:b:c".to_string(),
        reason: "key shall contain at most one ':'",
      }
    );
  }

  #[test]
  fn test_empty_halves_are_rejected() {
    for spec in ["", ":db", "mysql:"] {
      assert!(
        matches!(KeySpec::parse(spec), Err(InjectError::InvalidKey { .. })),
        "expected '{}' to be rejected",
        spec
      );
    }
  }
}
