//! Grouped-routes example: hooks, middlewares, nested groups.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:8080/
//!   curl http://localhost:8080/hello/Ann/
//!   curl http://localhost:8080/panic
//!   curl http://localhost:8080/group/hello/Bob/
//!   curl http://localhost:8080/group/red/Bob

use std::sync::Arc;

use routegroup::{
    handler_fn, hooks, middleware, BoxedHandler, Group, Request, Response, Server,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Root group: log every registration outcome, contain handler panics.
    let mut root = Group::builder()
        .on_register(hooks::log_route)
        .on_register_error(hooks::log_route_error)
        .middleware(middleware::recover)
        .build();

    root.handle_fn("GET /", index);

    // Middlewares added from here on apply to future registrations only;
    // the index route above stays unwrapped by `trace`.
    root.wrap(middleware::trace);

    // Already registered: the error hook logs this instead of aborting.
    root.handle_fn("GET /", index);

    // A handler can also be wrapped by hand at the call site.
    root.handle("GET /hello/{name}/", after(before(handler_fn(hello))));

    // The recover middleware turns this panic into a 500.
    root.handle_fn("GET /panic", panic_test);

    {
        let mut group = root.subgroup("/group");
        group.wrap(before).wrap(after);

        group.handle_fn("GET /", index);
        group.handle_fn("GET /hello/{name}/", hello);

        {
            // Inherited middlewares can be dropped and replaced wholesale.
            let mut sub = group.subgroup("/{color}");
            sub.clear_middlewares();
            sub.wrap(middleware::recover).wrap(middleware::trace);

            sub.handle_fn("GET /{name}", colored_hello);
        }
    }

    Server::bind("0.0.0.0:8080")
        .serve(root.mux())
        .await
        .expect("server error");
}

async fn index(req: Request) -> Response {
    Response::text(format!("index of {}", req.path()))
}

async fn hello(req: Request) -> Response {
    Response::text(format!("Hello {}", req.param("name").unwrap_or("stranger")))
}

async fn colored_hello(req: Request) -> Response {
    Response::text(format!(
        "Hello, color:{}, name:{}",
        req.param("color").unwrap_or("?"),
        req.param("name").unwrap_or("?"),
    ))
}

async fn panic_test(_req: Request) -> Response {
    panic!("something broke on purpose")
}

fn before(next: BoxedHandler) -> BoxedHandler {
    handler_fn(move |req: Request| {
        let next = Arc::clone(&next);
        async move {
            let res = next.call(req).await;
            let body = String::from_utf8_lossy(res.body()).into_owned();
            Response::text(format!(" before middleware ran, {body}"))
        }
    })
}

fn after(next: BoxedHandler) -> BoxedHandler {
    handler_fn(move |req: Request| {
        let next = Arc::clone(&next);
        async move {
            let res = next.call(req).await;
            let body = String::from_utf8_lossy(res.body()).into_owned();
            Response::text(format!("{body}, after middleware ran "))
        }
    })
}
