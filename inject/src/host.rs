//! The seam between the registry and a host web framework, plus a minimal
//! in-process host.

use crate::args::Args;
use crate::binding::Handler;
use crate::context::RequestContext;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Runs before the handler. A failure skips the remaining hooks and the handler.
pub type BeforeRequestHook = Box<dyn Fn(&RequestContext) -> Result<(), BoxError> + Send + Sync>;

/// Runs after the handler, whether it succeeded or not. Receives the
/// request's error, if any.
pub type TeardownHook =
  Box<dyn Fn(&RequestContext, Option<&DispatchError>) -> Result<(), BoxError> + Send + Sync>;

type Route = Box<dyn Fn(&RequestContext, Args) -> Result<String, BoxError> + Send + Sync>;

/// The lifecycle points a host framework offers to the registry.
pub trait Host {
  fn before_request(&mut self, hook: BeforeRequestHook);
  fn teardown_request(&mut self, hook: TeardownHook);
}

#[derive(Debug, Error)]
pub enum DispatchError {
  #[error("No route registered for '{0}'")]
  NotFound(String),

  #[error("Before-request hook failed: {0}")]
  Hook(#[source] BoxError),

  #[error("Handler failed: {0}")]
  Handler(#[source] BoxError),
}

/// A minimal in-process host: named routes, lifecycle hooks and dispatch.
///
/// It does no networking; `dispatch` plays the part of an incoming request.
#[derive(Default)]
pub struct App {
  before: Vec<BeforeRequestHook>,
  teardown: Vec<TeardownHook>,
  routes: HashMap<String, Route>,
  next_request_id: AtomicU64,
}

impl App {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `handler` under `path`, replacing any previous route.
  pub fn route<H>(&mut self, path: impl Into<String>, handler: H) -> &mut Self
  where
    H: Handler<Output = String> + Send + Sync + 'static,
    H::Error: Into<BoxError>,
  {
    let route: Route = Box::new(
      move |ctx: &RequestContext, args: Args| -> Result<String, BoxError> {
        handler.handle(ctx, args).map_err(Into::into)
      },
    );
    self.routes.insert(path.into(), route);
    self
  }

  pub fn dispatch(&self, path: &str) -> Result<String, DispatchError> {
    self.dispatch_with(path, Args::new())
  }

  /// Runs one request through the lifecycle:
  /// before-request hooks, the route, then every teardown hook.
  ///
  /// The request context, and with it the per-request injector, is dropped
  /// before this returns.
  pub fn dispatch_with(&self, path: &str, args: Args) -> Result<String, DispatchError> {
    let id = self.next_request_id.fetch_add(1, Ordering::Relaxed) + 1;
    let span = tracing::debug_span!("request", id, path);
    let _entered = span.enter();

    let ctx = RequestContext::new(id);
    tracing::debug!("request started");

    let outcome = self.run(&ctx, path, args);

    for hook in &self.teardown {
      if let Err(e) = hook(&ctx, outcome.as_ref().err()) {
        tracing::warn!(error = %e, "teardown hook failed");
      }
    }

    match &outcome {
      Ok(_) => tracing::debug!("request finished"),
      Err(e) => tracing::warn!(error = %e, "request failed"),
    }
    outcome
  }

  fn run(&self, ctx: &RequestContext, path: &str, args: Args) -> Result<String, DispatchError> {
    for hook in &self.before {
      hook(ctx).map_err(DispatchError::Hook)?;
    }
    let route = self
      .routes
      .get(path)
      .ok_or_else(|| DispatchError::NotFound(path.to_owned()))?;
    route(ctx, args).map_err(DispatchError::Handler)
  }
}

impl Host for App {
  fn before_request(&mut self, hook: BeforeRequestHook) {
    self.before.push(hook);
  }

  fn teardown_request(&mut self, hook: TeardownHook) {
    self.teardown.push(hook);
  }
}

impl fmt::Debug for App {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut routes: Vec<&str> = self.routes.keys().map(String::as_str).collect();
    routes.sort_unstable();
    f.debug_struct("App")
      .field("routes", &routes)
      .field("before_request_hooks", &self.before.len())
      .field("teardown_hooks", &self.teardown.len())
      .finish()
  }
}
