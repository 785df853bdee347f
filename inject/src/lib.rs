//! # Fibre Inject
//!
//! Request-scoped dependency injection for web frameworks.
//!
//! A process-wide root injector holds shared values (configuration, pools).
//! For every incoming request, the registry creates a child injector whose
//! parent is the root; request hooks populate it and handlers consume it by
//! declaring the keys they need.
//!
//! ## Core Concepts
//!
//! - **Injector**: a key-value store with an optional parent. A local miss
//!   falls back to the parent; a local hit always wins.
//! - **Registry**: owns the root and registers a before-request hook with
//!   the host, which attaches a fresh per-request injector to the
//!   [`RequestContext`].
//! - **Binding**: a list of key specifiers (`"version"`, `"mysql:db"`) a
//!   handler declares. Wrapping a handler in a binding resolves those keys
//!   from the active injector and passes them as named arguments.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_inject::{inject, App, InjectError, Injector, Registry};
//!
//! let registry = Registry::new(Injector::new());
//! registry.root_insert("version", String::from("v1.0")).unwrap();
//!
//! let mut app = App::new();
//! registry.initialize(&mut app);
//!
//! let show_version = inject(["version"]).unwrap().to(|_ctx, args| -> Result<String, InjectError> {
//!   Ok(args.require::<String>("version")?.to_string())
//! });
//! app.route("/version", show_version);
//!
//! assert_eq!(app.dispatch("/version").unwrap(), "v1.0");
//! ```

mod args;
mod binding;
mod config;
mod context;
mod core;
mod error;
mod host;
mod injector;
mod key;
mod macros;
mod registry;

pub use args::Args;
pub use binding::{inject, Binding, Bound, Handler};
pub use config::{find_config_file, ConfigError, ConfigValue, InjectConfig};
pub use context::RequestContext;
pub use crate::core::Value;
pub use error::{InjectError, Result};
pub use host::{App, BeforeRequestHook, BoxError, DispatchError, Host, TeardownHook};
pub use injector::{Injector, WeakInjector};
pub use key::KeySpec;
pub use registry::{Registry, DEFAULT_SELF_KEY};
