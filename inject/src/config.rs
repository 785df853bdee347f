//! Registry configuration: the self key and entries to seed the root with.
//!
//! ```yaml
//! self_key: injector
//! root:
//!   version: "v1.0"
//!   max_connections: 10
//!   debug: false
//!   replicas: ["db-1", "db-2"]
//! ```

use crate::core::{validate_key, Value};
use crate::error::InjectError;
use crate::injector::Injector;
use crate::registry::DEFAULT_SELF_KEY;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_CONFIG_BASE_NAME: &str = "fibre_inject";
const DEFAULT_CONFIG_EXTENSION: &str = "yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration file not found: {0}")]
  NotFound(String),

  #[error("Failed to read configuration file: {0}")]
  Read(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  Parse(String),

  #[error("Invalid configuration: {0}")]
  Inject(#[from] InjectError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InjectConfig {
  #[serde(default = "default_self_key")]
  pub self_key: String,
  #[serde(default)]
  pub root: BTreeMap<String, ConfigValue>,
}

fn default_self_key() -> String {
  DEFAULT_SELF_KEY.to_owned()
}

impl Default for InjectConfig {
  fn default() -> Self {
    Self {
      self_key: default_self_key(),
      root: BTreeMap::new(),
    }
  }
}

/// A configured root entry.
///
/// Scalars are stored as plain Rust values (`String`, `bool`, `i64`, `f64`);
/// integers beyond `i64::MAX` keep their exact value as `u64`. Lists and maps
/// are stored as a `serde_json::Value`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
  Null,
  Bool(bool),
  Int(i64),
  UInt(u64),
  Float(f64),
  Str(String),
  Other(serde_json::Value),
}

impl ConfigValue {
  /// The value to map, or `None` for an explicit null.
  pub fn to_value(&self) -> Option<Value> {
    match self {
      ConfigValue::Null => None,
      ConfigValue::Bool(b) => Some(Arc::new(*b)),
      ConfigValue::Int(i) => Some(Arc::new(*i)),
      ConfigValue::UInt(u) => Some(Arc::new(*u)),
      ConfigValue::Float(x) => Some(Arc::new(*x)),
      ConfigValue::Str(s) => Some(Arc::new(s.clone())),
      ConfigValue::Other(v) => Some(Arc::new(v.clone())),
    }
  }
}

impl InjectConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
    serde_yaml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
  }

  pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
    serde_json::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
  }

  /// Loads a config file. `.json` files are parsed as JSON, anything else as YAML.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    tracing::debug!(path = %path.display(), "loading inject config");
    let source = std::fs::read_to_string(path)?;
    let is_json = path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
      Self::from_json_str(&source)
    } else {
      Self::from_yaml_str(&source)
    }
  }

  /// Maps every configured entry into `injector`.
  ///
  /// All keys are validated first, so an invalid key leaves `injector` unchanged.
  pub fn apply_to(&self, injector: &Injector) -> Result<(), InjectError> {
    validate_key(&self.self_key)?;
    for key in self.root.keys() {
      validate_key(key)?;
    }
    for (key, value) in &self.root {
      match value.to_value() {
        Some(value) => injector.map([(key.as_str(), value)])?,
        None => injector.map_null(key.as_str())?,
      };
    }
    tracing::debug!(entries = self.root.len(), "seeded injector from config");
    Ok(())
  }
}

/// Finds the configuration file based on an optional environment suffix.
///
/// Looks for `fibre_inject.<env>.yaml` and then `fibre_inject.yaml` in the
/// current directory. The suffix falls back to `FIBRE_ENV`, then `APP_ENV`.
pub fn find_config_file(environment_suffix: Option<&str>) -> Result<PathBuf, ConfigError> {
  find_config_file_in(Path::new("."), environment_suffix)
}

fn find_config_file_in(dir: &Path, environment_suffix: Option<&str>) -> Result<PathBuf, ConfigError> {
  let environment = environment_suffix
    .map(str::to_owned)
    .or_else(|| env::var("FIBRE_ENV").ok())
    .or_else(|| env::var("APP_ENV").ok())
    .filter(|name| !name.is_empty());

  let candidates: Vec<PathBuf> = environment
    .iter()
    .map(|name| format!("{DEFAULT_CONFIG_BASE_NAME}.{name}.{DEFAULT_CONFIG_EXTENSION}"))
    .chain([format!("{DEFAULT_CONFIG_BASE_NAME}.{DEFAULT_CONFIG_EXTENSION}")])
    .map(|file_name| dir.join(file_name))
    .collect();

  match candidates.iter().find(|path| path.is_file()) {
    Some(path) => {
      tracing::debug!(path = %path.display(), "found inject config");
      Ok(path.clone())
    }
    None => Err(ConfigError::NotFound(format!(
      "no inject config among {:?}; set FIBRE_ENV or APP_ENV to pick an environment file",
      candidates
    ))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use std::fs;

  #[test]
  fn test_scalar_mapping_from_yaml() {
    let config = InjectConfig::from_yaml_str(
      r#"
root:
  version: "v1.0"
  max_connections: 10
  ratio: 0.5
  debug: true
  mysql: ~
  replicas: ["db-1", "db-2"]
"#,
    )
    .unwrap();

    assert_eq!(config.self_key, "injector");
    assert_eq!(config.root["version"], ConfigValue::Str("v1.0".into()));
    assert_eq!(config.root["max_connections"], ConfigValue::Int(10));
    assert_eq!(config.root["ratio"], ConfigValue::Float(0.5));
    assert_eq!(config.root["debug"], ConfigValue::Bool(true));
    assert_eq!(config.root["mysql"], ConfigValue::Null);
    assert_eq!(
      config.root["replicas"],
      ConfigValue::Other(serde_json::json!(["db-1", "db-2"]))
    );
  }

  #[test]
  fn test_integers_beyond_i64_stay_exact() {
    let config = InjectConfig::from_yaml_str(
      "root:\n  big: 18446744073709551615\n  small: -3\n",
    )
    .unwrap();

    assert_eq!(config.root["big"], ConfigValue::UInt(u64::MAX));
    assert_eq!(config.root["small"], ConfigValue::Int(-3));

    let root = Injector::new();
    config.apply_to(&root).unwrap();
    assert_eq!(*root.get_as::<u64>("big").unwrap(), u64::MAX);
    assert!(root.get_as::<f64>("big").is_none());
  }

  #[test]
  fn test_unknown_fields_are_rejected() {
    let err = InjectConfig::from_yaml_str("roots: {}").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn test_find_config_prefers_environment_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("fibre_inject.yaml"), "root: {}").unwrap();
    fs::write(dir.path().join("fibre_inject.staging.yaml"), "root: {}").unwrap();

    let found = find_config_file_in(dir.path(), Some("staging")).unwrap();
    assert_eq!(found, dir.path().join("fibre_inject.staging.yaml"));

    let found = find_config_file_in(dir.path(), Some("prod")).unwrap();
    assert_eq!(found, dir.path().join("fibre_inject.yaml"));
  }

  #[test]
  fn test_find_config_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = find_config_file_in(dir.path(), Some("prod")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
  }
}
