use fibre_inject::{inject, Args, Handler, InjectError, Injector, RequestContext};

fn main() {
  let show_version = inject(["version"])
    .unwrap()
    .to(|_ctx, args| -> Result<String, InjectError> {
      Ok(args.require::<String>("version")?.to_string())
    });

  // --- A request whose before-request hook never ran ---
  println!("Calling a bound handler without a request injector...");
  let ctx = RequestContext::new(1);
  match show_version.handle(&ctx, Args::new()) {
    Err(InjectError::NoActiveInjector) => println!("Correctly failed: no active injector."),
    other => panic!("expected NoActiveInjector, got {:?}", other),
  }

  // --- An injector that simply lacks the key ---
  println!("\nNow attaching an injector that does not map 'version'...");
  ctx.attach(Injector::new());
  match show_version.handle(&ctx, Args::new()) {
    Err(InjectError::Unresolved { name }) => println!("Correctly unresolved: '{}'.", name),
    other => panic!("expected Unresolved, got {:?}", other),
  }

  // --- A malformed key specifier is rejected before any handler exists ---
  let err = inject(["a:b:c"]).unwrap_err();
  println!("\nRejected specifier: {}", err);
}
