//! End-to-end exercises through the public API: build a group hierarchy,
//! register routes, dispatch requests straight into the mux.

use std::sync::{Arc, Mutex};

use http::{Method, StatusCode};
use routegroup::{handler_fn, BoxedHandler, Group, Mux, RegisterError, Request, Response};

async fn index(_req: Request) -> Response {
    Response::text("index of /")
}

async fn hello(req: Request) -> Response {
    Response::text(format!("Hello {}", req.param("name").unwrap_or("stranger")))
}

/// Runs before the handler: prepends to whatever body the inner chain
/// produces.
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

/// Runs after the handler: appends to the body.
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

#[tokio::test]
async fn index_route_round_trip() {
    let root = Group::new();
    root.handle_fn("GET /", index);

    let res = root.mux().dispatch(Request::new(Method::GET, "/")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"index of /");
}

#[tokio::test]
async fn wrapped_hello_interleaves_middleware_output() {
    let mut root = Group::new();
    root.wrap(before).wrap(after);
    root.handle_fn("GET /hello/{name}/", hello);

    let res = root.mux().dispatch(Request::new(Method::GET, "/hello/Ann/")).await;
    assert_eq!(
        String::from_utf8_lossy(res.body()),
        " before middleware ran, Hello Ann, after middleware ran "
    );
}

#[tokio::test]
async fn nested_groups_register_under_concatenated_prefixes() {
    let root = Group::new();
    let group = root.subgroup("/group");
    let leaf = group.subgroup("/{id}");
    leaf.handle_fn("GET /x", |req: Request| async move {
        Response::text(format!("x in {}", req.param("id").unwrap_or("?")))
    });

    let res = root.mux().dispatch(Request::new(Method::GET, "/group/42/x")).await;
    assert_eq!(res.body(), b"x in 42");

    // Nothing was registered at the intermediate levels.
    let res = root.mux().dispatch(Request::new(Method::GET, "/group/x")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn two_roots_can_share_one_mux() {
    let mux = Arc::new(Mux::new());
    let api = Group::builder().mux(Arc::clone(&mux)).prefix("/api").build();
    let admin = Group::builder().mux(Arc::clone(&mux)).prefix("/admin").build();

    api.handle_fn("GET /x", index);
    admin.handle_fn("GET /x", index);

    for path in ["/api/x", "/admin/x"] {
        let res = mux.dispatch(Request::new(Method::GET, path)).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }
}

#[tokio::test]
async fn duplicate_registration_is_observed_not_fatal() {
    let failures: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let root = Group::builder()
        .on_register_error({
            let failures = Arc::clone(&failures);
            move |pattern: &str, err: &RegisterError| {
                assert!(matches!(err, RegisterError::Duplicate { .. }));
                failures.lock().unwrap().push(pattern.to_owned());
            }
        })
        .build();

    root.handle_fn("GET /", index);
    root.handle_fn("GET /", hello); // dropped, observed by the hook

    assert_eq!(*failures.lock().unwrap(), ["GET /"]);

    // The first registration still answers.
    let res = root.mux().dispatch(Request::new(Method::GET, "/")).await;
    assert_eq!(res.body(), b"index of /");
}
