//! Per-request storage for the active injector.

use crate::error::{InjectError, Result};
use crate::injector::Injector;
use parking_lot::RwLock;
use std::fmt;

/// The per-request slot a host hands to its hooks and handlers.
///
/// Each request gets its own context, so the injector attached to it is
/// never visible to concurrent requests. Dropping the context discards the
/// per-request injector.
pub struct RequestContext {
  id: u64,
  injector: RwLock<Option<Injector>>,
}

impl RequestContext {
  pub fn new(id: u64) -> Self {
    Self {
      id,
      injector: RwLock::new(None),
    }
  }

  pub fn id(&self) -> u64 {
    self.id
  }

  /// Attaches `injector` as the active injector, returning the one it replaces.
  pub fn attach(&self, injector: Injector) -> Option<Injector> {
    self.injector.write().replace(injector)
  }

  /// Takes the active injector out of the context.
  pub fn detach(&self) -> Option<Injector> {
    self.injector.write().take()
  }

  pub fn injector(&self) -> Option<Injector> {
    self.injector.read().clone()
  }

  /// Returns the active injector or fails with [`InjectError::NoActiveInjector`].
  pub fn require_injector(&self) -> Result<Injector> {
    self.injector().ok_or(InjectError::NoActiveInjector)
  }
}

impl fmt::Debug for RequestContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RequestContext")
      .field("id", &self.id)
      .field("injector", &*self.injector.read())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_context_has_no_active_injector() {
    let ctx = RequestContext::new(7);
    assert_eq!(ctx.id(), 7);
    assert_eq!(
      ctx.require_injector().unwrap_err(),
      InjectError::NoActiveInjector
    );
  }

  #[test]
  fn test_attach_replaces_and_detach_takes() {
    let ctx = RequestContext::new(1);
    let first = Injector::new();
    let second = Injector::new();

    assert!(ctx.attach(first.clone()).is_none());
    let replaced = ctx.attach(second.clone()).unwrap();
    assert!(replaced.ptr_eq(&first));

    let taken = ctx.detach().unwrap();
    assert!(taken.ptr_eq(&second));
    assert!(ctx.injector().is_none());
  }

  #[test]
  fn test_dropping_context_discards_injector() {
    let ctx = RequestContext::new(1);
    let injector = Injector::new();
    let weak = injector.downgrade();
    ctx.attach(injector);

    assert!(weak.upgrade().is_some());
    drop(ctx);
    assert!(weak.upgrade().is_none());
  }
}
