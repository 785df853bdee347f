use fibre_inject::{
  inject, App, Args, BoxError, DispatchError, Handler, Host, InjectError, Injector, Registry,
  RequestContext,
};
use tracing_subscriber::EnvFilter;

type Headers = Vec<(String, String)>;

// Maps a freshly computed value into the request injector, then delegates.
fn authentication<H>(inner: H) -> impl Handler<Output = H::Output, Error = InjectError>
where
  H: Handler<Error = InjectError>,
{
  inject(["injector"])
    .unwrap()
    .to(move |ctx, args| -> Result<H::Output, InjectError> {
      args
        .require::<Injector>("injector")?
        .insert("auth", String::from("Auth Passed"))?;
      inner.handle(ctx, args)
    })
}

fn main() -> Result<(), BoxError> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let registry = Registry::new(Injector::new());
  let mut app = App::new();
  registry.initialize(&mut app);

  // --- Request Hooks ---
  let before = inject(["injector"])?.to(|_ctx, args| -> Result<(), InjectError> {
    let injector = args.require::<Injector>("injector")?;
    let headers: Headers = vec![
      ("Host".into(), "localhost:8080".into()),
      ("Accept".into(), "text/html".into()),
    ];
    injector
      .insert("version", String::from("v1.0"))?
      .insert("mysql", String::from("mysql connection"))?
      .insert("headers", headers)?;
    Ok(())
  });
  app.before_request(Box::new(move |ctx: &RequestContext| -> Result<(), BoxError> {
    before.handle(ctx, Args::new())?;
    Ok(())
  }));

  let teardown = inject(["mysql"])?.to(|ctx, args| -> Result<(), InjectError> {
    let mysql = args.require::<String>("mysql")?;
    tracing::info!(request = ctx.id(), %mysql, "teardown request");
    Ok(())
  });
  app.teardown_request(Box::new(
    move |ctx: &RequestContext, _error: Option<&DispatchError>| -> Result<(), BoxError> {
      teardown.handle(ctx, Args::new())?;
      Ok(())
    },
  ));

  // --- Routes ---
  app.route(
    "/headers",
    inject(["headers"])?.to(|_ctx, args| -> Result<String, InjectError> {
      let headers = args.require::<Headers>("headers")?;
      Ok(
        headers
          .iter()
          .map(|(key, value)| format!("{}: {}<br />", key, value))
          .collect(),
      )
    }),
  );
  app.route(
    "/version",
    inject(["version"])?.to(|_ctx, args| -> Result<String, InjectError> {
      Ok(args.require::<String>("version")?.to_string())
    }),
  );
  app.route(
    "/mysql",
    inject(["mysql:conn"])?.to(|_ctx, args| -> Result<String, InjectError> {
      let status = if args.get::<String>("conn").is_some() {
        "success"
      } else {
        "fail"
      };
      Ok(status.to_string())
    }),
  );
  app.route(
    "/auth",
    authentication(inject(["auth"])?.to(|_ctx, args| -> Result<String, InjectError> {
      Ok(args.require::<String>("auth")?.to_string())
    })),
  );

  for path in ["/version", "/mysql", "/auth", "/headers", "/missing"] {
    match app.dispatch(path) {
      Ok(body) => println!("GET {} -> {}", path, body),
      Err(e) => println!("GET {} -> error: {}", path, e),
    }
  }

  Ok(())
}
