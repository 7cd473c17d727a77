//! The request multiplexer.
//!
//! One radix tree per HTTP method (plus one for method-less patterns),
//! O(path-length) lookup via [`matchit`]. The mux owns every registered
//! route; groups only decorate and forward. A single [`Mux`] instance is
//! shared behind an `Arc` by a root group and all of its descendants, so
//! registrations from anywhere in the hierarchy land in one routing table.
//!
//! # Pattern grammar
//!
//! A pattern is an optional `"METHOD "` token followed by a path template:
//!
//! ```text
//! GET /users/{id}     method-specific
//! /healthz            matches every method
//! ```
//!
//! Path templates use [`matchit`] syntax (`{name}` segments, retrieved at
//! request time with [`Request::param`]). A method-specific registration
//! shadows a method-less one for that method.
//!
//! Registration is expected to happen on one thread during startup, before
//! traffic begins; the internal lock exists so the table can be shared with
//! connection tasks, not to make concurrent registration a supported
//! pattern.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use http::{Method, StatusCode};
use matchit::Router as PathTree;

use crate::error::RegisterError;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::Response;

/// The shared routing table.
pub struct Mux {
    routes: RwLock<HashMap<Option<Method>, PathTree<BoxedHandler>>>,
}

impl Mux {
    pub fn new() -> Self {
        Self { routes: RwLock::new(HashMap::new()) }
    }

    /// Registers `handler` under `pattern`.
    ///
    /// Fails with [`RegisterError::Duplicate`] when the exact pattern is
    /// already present, and with [`RegisterError::Invalid`] when the method
    /// token or path template does not parse. A failed registration leaves
    /// the table untouched; there is nothing to retry.
    pub fn register(&self, pattern: &str, handler: BoxedHandler) -> Result<(), RegisterError> {
        let (method, path) = split_pattern(pattern)?;

        let mut routes = self.routes.write().expect("route table lock poisoned");
        routes.entry(method).or_default().insert(path, handler).map_err(|e| match e {
            matchit::InsertError::Conflict { .. } => {
                RegisterError::Duplicate { pattern: pattern.to_owned() }
            }
            other => RegisterError::Invalid { pattern: pattern.to_owned(), reason: other.to_string() },
        })
    }

    /// Routes `req` to the matching handler, or answers `404 Not Found`.
    ///
    /// Path parameters extracted by the match are attached to the request
    /// before the handler runs.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.set_params(params);
                handler.call(req).await
            }
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let routes = self.routes.read().expect("route table lock poisoned");

        // Method-specific tree first, method-less fallback second.
        for key in [Some(method.clone()), None] {
            let Some(tree) = routes.get(&key) else { continue };
            let Ok(matched) = tree.at(path) else { continue };

            let handler = Arc::clone(matched.value);
            let params = matched
                .params
                .iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Some((handler, params));
        }
        None
    }
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits `"METHOD /path"` on the first space. No space means the whole
/// pattern is a path matching every method.
fn split_pattern(pattern: &str) -> Result<(Option<Method>, &str), RegisterError> {
    match pattern.split_once(' ') {
        None => Ok((None, pattern)),
        Some((method, path)) => match Method::from_str(method) {
            Ok(method) => Ok((Some(method), path)),
            Err(e) => Err(RegisterError::Invalid {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            }),
        },
    }
}
