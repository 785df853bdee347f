use thiserror::Error;

/// The error type for injector, binding and registry operations.
///
/// Every variant describes incorrect use of the library (bad keys, missing
/// wiring) rather than an operational failure, so none of them is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectError {
  #[error("Invalid key '{key}': {reason}")]
  InvalidKey { key: String, reason: &'static str },

  /// A binding ran without a per-request injector attached to the request context.
  #[error("No active injector found in the request context")]
  NoActiveInjector,

  /// The parent an injector was constructed from is no longer alive.
  #[error("Parent injector is not a live injector")]
  InvalidParent,

  #[error("No value bound for parameter '{name}'")]
  Unresolved { name: String },

  #[error("Value bound for parameter '{name}' is not a {expected}")]
  TypeMismatch { name: String, expected: &'static str },
}

impl InjectError {
  pub(crate) fn invalid_key(key: &str, reason: &'static str) -> Self {
    InjectError::InvalidKey {
      key: key.to_owned(),
      reason,
    }
  }
}

/// A specialized `Result` type for `fibre_inject` operations.
pub type Result<T, E = InjectError> = std::result::Result<T, E>;
