//! Declarative parameter binding for handlers.
//!
//! A [`Binding`] is the list of key specifiers a handler depends on, parsed
//! and validated once when the handler is registered. Wrapping a handler in a
//! binding yields a [`Bound`] handler which, on every call, resolves those
//! keys from the request's active injector and hands them over as named
//! arguments.

use crate::args::Args;
use crate::context::RequestContext;
use crate::error::{InjectError, Result};
use crate::injector::Injector;
use crate::key::KeySpec;

/// Something a host can call with a request context and arguments.
///
/// Implemented for closures `Fn(&RequestContext, Args) -> Result<T, E>` and
/// for [`Bound`], so bindings stack: an outer binding's named arguments are
/// passed on to the inner handler untouched.
pub trait Handler {
  type Output;
  type Error: From<InjectError>;

  fn handle(&self, ctx: &RequestContext, args: Args) -> Result<Self::Output, Self::Error>;
}

impl<F, T, E> Handler for F
where
  F: Fn(&RequestContext, Args) -> Result<T, E>,
  E: From<InjectError>,
{
  type Output = T;
  type Error = E;

  fn handle(&self, ctx: &RequestContext, args: Args) -> Result<T, E> {
    self(ctx, args)
  }
}

/// The validated list of keys a handler declares.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binding {
  specs: Vec<KeySpec>,
}

impl Binding {
  /// Parses every key specifier up front.
  ///
  /// Fails with [`InjectError::InvalidKey`] on the first malformed one.
  pub fn new<I, S>(keys: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let specs = keys
      .into_iter()
      .map(|key| KeySpec::parse(key.as_ref()))
      .collect::<Result<Vec<_>>>()?;
    Ok(Self { specs })
  }

  pub fn specs(&self) -> &[KeySpec] {
    &self.specs
  }

  /// Wraps any handler, including another [`Bound`].
  pub fn wrap<H: Handler>(self, handler: H) -> Bound<H> {
    Bound {
      binding: self,
      handler,
    }
  }

  /// Wraps a closure. Equivalent to [`Binding::wrap`], but lets the
  /// compiler infer the closure's argument types.
  pub fn to<F, T, E>(self, handler: F) -> Bound<F>
  where
    F: Fn(&RequestContext, Args) -> Result<T, E>,
    E: From<InjectError>,
  {
    self.wrap(handler)
  }
}

/// Builds a [`Binding`] from key specifiers such as `"version"` or `"mysql:db"`.
pub fn inject<I, S>(keys: I) -> Result<Binding>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  Binding::new(keys)
}

/// A handler wrapped in a [`Binding`].
#[derive(Debug, Clone)]
pub struct Bound<H> {
  binding: Binding,
  handler: H,
}

impl<H: Handler> Bound<H> {
  pub fn binding(&self) -> &Binding {
    &self.binding
  }

  /// Resolves the declared keys from `injector` instead of the context's
  /// active injector, then calls the wrapped handler.
  pub fn handle_with(
    &self,
    injector: &Injector,
    ctx: &RequestContext,
    args: Args,
  ) -> Result<H::Output, H::Error> {
    injector.apply_specs(
      self.binding.specs(),
      |args| self.handler.handle(ctx, args),
      args,
    )
  }
}

impl<H: Handler> Handler for Bound<H> {
  type Output = H::Output;
  type Error = H::Error;

  fn handle(&self, ctx: &RequestContext, args: Args) -> Result<H::Output, H::Error> {
    let injector = ctx.require_injector()?;
    self.handle_with(&injector, ctx, args)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  #[test]
  fn test_binding_rejects_bad_specifier_eagerly() {
    let err = inject(["version", "a:b:c"]).unwrap_err();
    assert!(matches!(err, InjectError::InvalidKey { ref key, .. } if key == "a:b:c"));
  }

  #[test]
  fn test_bound_handler_without_injector_fails() {
    let bound = inject(["version"])
      .unwrap()
      .to(|_ctx, _args| -> Result<(), InjectError> { panic!("handler must not run") });
    let ctx = RequestContext::new(1);

    assert_eq!(
      bound.handle(&ctx, Args::new()).unwrap_err(),
      InjectError::NoActiveInjector
    );
  }

  #[test]
  fn test_handle_with_uses_explicit_injector() {
    let injector = Injector::new();
    injector.insert("version", "v2").unwrap();
    let bound = inject(["version:v"])
      .unwrap()
      .to(|_ctx, args| -> Result<Arc<&'static str>, InjectError> { args.require::<&'static str>("v") });

    let ctx = RequestContext::new(1);
    let out = bound.handle_with(&injector, &ctx, Args::new()).unwrap();
    assert_eq!(*out, "v2");
  }
}
