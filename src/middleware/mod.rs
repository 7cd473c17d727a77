//! Ready-made middlewares.
//!
//! A middleware is any function from [`BoxedHandler`] to [`BoxedHandler`];
//! see [`Middleware`](crate::Middleware) for the contract. The two shipped
//! here cover the cross-cutting pair nearly every service wants, and double
//! as reference implementations for writing your own:
//!
//! - [`trace`] — per-request log line with method, path, status, latency
//! - [`recover`] — a panicking handler answers `500` instead of killing the
//!   connection task
//!
//! Add them per group:
//!
//! ```rust
//! use routegroup::{middleware, Group};
//!
//! let mut root = Group::new();
//! root.wrap(middleware::recover).wrap(middleware::trace);
//! ```
//!
//! Order matters: the last-added middleware runs outermost. In the snippet
//! above `trace` wraps `recover`, so the log line carries the `500` that
//! `recover` produced rather than being skipped by the panic.

use std::sync::Arc;
use std::time::Instant;

use http::StatusCode;
use tracing::{error, info};

use crate::handler::{handler_fn, BoxedHandler};
use crate::request::Request;
use crate::response::Response;

/// Logs one line per request: method, path, response status, and how long
/// the wrapped handler took.
pub fn trace(next: BoxedHandler) -> BoxedHandler {
    handler_fn(move |req: Request| {
        let next = Arc::clone(&next);
        async move {
            let method = req.method().clone();
            let path = req.path().to_owned();
            let start = Instant::now();

            let res = next.call(req).await;

            info!(
                %method,
                path,
                status = res.status_code().as_u16(),
                took = ?start.elapsed(),
                "http request"
            );
            res
        }
    })
}

/// Contains a panicking handler and answers `500 Internal Server Error`.
///
/// The wrapped handler runs on its own tokio task; a panic surfaces as a
/// [`JoinError`](tokio::task::JoinError) there instead of unwinding through
/// the connection task.
pub fn recover(next: BoxedHandler) -> BoxedHandler {
    handler_fn(move |req: Request| {
        let next = Arc::clone(&next);
        async move {
            let method = req.method().clone();
            let path = req.path().to_owned();

            match tokio::task::spawn(async move { next.call(req).await }).await {
                Ok(res) => res,
                Err(e) => {
                    error!(%method, path, "handler panicked: {e}");
                    Response::status(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;

    async fn boom(_req: Request) -> Response {
        panic!("boom")
    }

    #[tokio::test]
    async fn recover_turns_panic_into_500() {
        let res = recover(handler_fn(boom)).call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn recover_passes_normal_responses_through() {
        let ok = handler_fn(|_req: Request| async { Response::text("fine") });

        let res = recover(ok).call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"fine");
    }

    #[tokio::test]
    async fn trace_does_not_alter_the_response() {
        let ok = handler_fn(|_req: Request| async { Response::text("fine") });

        let res = trace(ok).call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"fine");
    }
}
