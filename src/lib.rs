//! # routegroup
//!
//! Nested route groups atop an HTTP multiplexer. A [`Group`] carries a
//! path prefix and an ordered middleware chain; registering a route through
//! it wraps the handler with the chain, prepends the prefix, and forwards to
//! the [`Mux`] shared by the whole hierarchy. The mux does the actual
//! matching and dispatch.
//!
//! ## The composition rules
//!
//! The entire crate boils down to four of them:
//!
//! - **Prefixes concatenate.** A subgroup's prefix is its parent's prefix
//!   plus the supplied suffix, snapshotted at derivation time. Pure string
//!   append: you supply the slashes, nothing is normalized.
//! - **Middleware folds in order.** The first-added middleware ends up
//!   innermost, the last-added outermost. `wrap(A)` then `wrap(B)` runs
//!   B-pre, A-pre, handler, A-post, B-post.
//! - **Derivation and registration snapshot.** Adding a middleware after a
//!   subgroup was derived, or after a route was registered, changes
//!   neither. Only future derivations and registrations on that exact group
//!   see it.
//! - **One mux per hierarchy.** Every group derived from a root shares the
//!   same [`Mux`] instance; registrations land in one routing table.
//!
//! Duplicate registration of an exact pattern is fatal by default, matching
//! the mux's view that a broken route table should not reach traffic.
//! Installing an error hook ([`GroupBuilder::on_register_error`]) downgrades
//! it to an observed event: the hook sees the pattern and the failure, the
//! first registration stays active, and startup continues.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use routegroup::{hooks, middleware, Group, Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut root = Group::builder()
//!         .on_register(hooks::log_route)
//!         .on_register_error(hooks::log_route_error)
//!         .middleware(middleware::recover)
//!         .build();
//!
//!     root.handle_fn("GET /", index);
//!
//!     let mut api = root.subgroup("/api");
//!     api.wrap(middleware::trace);
//!     api.handle_fn("GET /users/{id}", get_user);   // GET /api/users/{id}
//!
//!     Server::bind("0.0.0.0:3000").serve(root.mux()).await.unwrap();
//! }
//!
//! async fn index(_req: Request) -> Response {
//!     Response::text("index of /")
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```
//!
//! ## Registration is a startup affair
//!
//! Call `handle`/`wrap`/`subgroup` from one thread before serving traffic.
//! Groups take no locks around their prefix or middleware chain; once
//! traffic flows, requests only touch the mux's routing table and the
//! handlers frozen into it.

mod error;
mod group;
mod handler;
mod mux;
mod request;
mod response;
mod server;

pub mod hooks;
pub mod middleware;

pub use error::{Error, RegisterError};
pub use group::{Group, GroupBuilder, Middleware, RegisterErrorHook, RegisterHook};
pub use handler::{handler_fn, BoxFuture, BoxedHandler, ErasedHandler, Handler};
pub use mux::Mux;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use server::Server;
