//! Handler trait and type erasure.
//!
//! The multiplexer stores handlers of *different* concrete types in one
//! routing table, and middlewares receive a handler and return another one
//! without knowing what is inside. Both needs are met the same way: every
//! handler is erased to a [`BoxedHandler`], an `Arc<dyn ErasedHandler>`.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ group.handle_fn("GET /hello", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓ wrapped by the group's middleware chain
//! stored as BoxedHandler = Arc<dyn ErasedHandler>
//!        ↓ at request time
//! handler.call(req)                                ← one vtable dispatch
//! ```
//!
//! Per request the runtime cost is one `Arc` clone plus one virtual call,
//! negligible next to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` because the runtime must poll the future in place;
/// `Send + 'static` so tokio may move it across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Object-safe dispatch interface behind every registered handler.
///
/// Middleware authors interact with this through [`BoxedHandler`]: call
/// `next.call(req).await` to delegate to the wrapped handler.
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// This is the currency of the middleware contract: a middleware is any
/// function from `BoxedHandler` to `BoxedHandler`.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is **sealed** via the private `Sealed` supertrait: only the
/// blanket impl below can satisfy it, which keeps the API surface stable.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

/// `Fn(Request) -> Fut` covers named `async fn` items, `async` closures,
/// and any struct implementing `Fn`.
impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Erase a handler function into a [`BoxedHandler`].
///
/// Mostly useful when writing a middleware, which must produce a
/// `BoxedHandler` from a closure that delegates to the one it received:
///
/// ```rust
/// use std::sync::Arc;
/// use routegroup::{handler_fn, BoxedHandler, Request};
///
/// fn noop(next: BoxedHandler) -> BoxedHandler {
///     handler_fn(move |req: Request| {
///         let next = Arc::clone(&next);
///         async move { next.call(req).await }
///     })
/// }
/// ```
pub fn handler_fn<H: Handler>(handler: H) -> BoxedHandler {
    handler.into_boxed_handler()
}

/// Newtype bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
