//! Ready-made registration hooks.
//!
//! Install them when building the root group to get one `tracing` line per
//! registration outcome:
//!
//! ```rust
//! use routegroup::{hooks, Group};
//!
//! let root = Group::builder()
//!     .on_register(hooks::log_route)
//!     .on_register_error(hooks::log_route_error)
//!     .build();
//! ```

use tracing::{error, info};

use crate::error::RegisterError;

/// Logs each route as it is registered.
pub fn log_route(pattern: &str) {
    info!(pattern, "route registered");
}

/// Logs each registration the multiplexer refused. With this installed a
/// duplicate route is reported instead of taking the process down.
pub fn log_route_error(pattern: &str, err: &RegisterError) {
    error!(pattern, error = %err, "route registration failed");
}
