//! The registry owning the root injector and wiring per-request injectors.

use crate::args::Args;
use crate::config::InjectConfig;
use crate::context::RequestContext;
use crate::core::{validate_key, Value};
use crate::error::Result;
use crate::host::{BoxError, Host};
use crate::injector::Injector;
use std::any::Any;
use std::sync::Arc;

/// The key a per-request injector maps itself under by default.
pub const DEFAULT_SELF_KEY: &str = "injector";

/// Owns the process-wide root injector.
///
/// The root is built by the application's startup code and handed in, so
/// there is no hidden global. Once [`Registry::initialize`] has registered
/// the before-request hook, every request gets a fresh child of the root.
///
/// # Examples
///
/// ```
/// use fibre_inject::{Injector, Registry, RequestContext};
///
/// let registry = Registry::new(Injector::new());
/// registry.root_insert("version", "v1.0").unwrap();
///
/// let ctx = RequestContext::new(1);
/// let injector = registry.on_before_request(&ctx).unwrap();
/// assert_eq!(*injector.get_as::<&str>("version").unwrap(), "v1.0");
/// ```
#[derive(Debug)]
pub struct Registry {
  root: Injector,
  self_key: String,
}

impl Registry {
  pub fn new(root: Injector) -> Arc<Self> {
    Arc::new(Self {
      root,
      self_key: DEFAULT_SELF_KEY.to_owned(),
    })
  }

  /// Like [`Registry::new`], with per-request injectors mapped under `self_key`.
  pub fn with_self_key(root: Injector, self_key: impl Into<String>) -> Result<Arc<Self>> {
    let self_key = self_key.into();
    validate_key(&self_key)?;
    Ok(Arc::new(Self { root, self_key }))
  }

  /// Builds a registry with a fresh root seeded from `config`.
  pub fn from_config(config: &InjectConfig) -> Result<Arc<Self>> {
    let root = Injector::new();
    config.apply_to(&root)?;
    Self::with_self_key(root, config.self_key.clone())
  }

  /// Registers the before-request hook with `host`.
  ///
  /// The host owns the hook; the registry keeps no reference to the host.
  pub fn initialize<H: Host + ?Sized>(self: &Arc<Self>, host: &mut H) {
    let registry = Arc::clone(self);
    host.before_request(Box::new(
      move |ctx: &RequestContext| -> Result<(), BoxError> {
        registry.on_before_request(ctx)?;
        Ok(())
      },
    ));
    tracing::debug!(self_key = %self.self_key, "registry attached to host");
  }

  /// Creates the per-request injector and attaches it to `ctx`.
  ///
  /// The new injector's parent is the root, and it maps itself under the
  /// registry's self key.
  pub fn on_before_request(&self, ctx: &RequestContext) -> Result<Injector> {
    let injector = Injector::child_of(&self.root);
    injector.bind_self(self.self_key.as_str())?;
    if ctx.attach(injector.clone()).is_some() {
      tracing::warn!(
        request = ctx.id(),
        "replaced an injector already attached to the request"
      );
    }
    tracing::debug!(request = ctx.id(), injector = ?injector, "request injector attached");
    Ok(injector)
  }

  pub fn root(&self) -> &Injector {
    &self.root
  }

  pub fn self_key(&self) -> &str {
    &self.self_key
  }

  // --- Root pass-throughs ---

  pub fn root_map<I, K>(&self, entries: I) -> Result<&Self>
  where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
  {
    self.root.map(entries)?;
    Ok(self)
  }

  pub fn root_insert<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) -> Result<&Self> {
    self.root.insert(key, value)?;
    Ok(self)
  }

  pub fn root_get(&self, key: &str) -> Option<Value> {
    self.root.get(key)
  }

  /// Calls `target` with `keys` resolved against the root injector.
  pub fn root_apply<I, S, F, R>(&self, keys: I, target: F, args: Args) -> Result<R>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnOnce(Args) -> R,
  {
    self.root.apply(keys, target, args)
  }
}
