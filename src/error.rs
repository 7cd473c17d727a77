//! Error types.
//!
//! Two failure surfaces exist and they do not overlap:
//!
//! - [`Error`] — infrastructure failures while serving: binding a port,
//!   accepting a connection. Application-level outcomes (404, 500, …) are
//!   expressed as HTTP [`Response`](crate::Response) values, never as errors.
//! - [`RegisterError`] — a route registration was rejected by the
//!   multiplexer. This is the payload handed to a group's failure hook; with
//!   no hook installed it is fatal (see [`Group::handle`](crate::Group::handle)).

use std::fmt;

/// The error type returned by fallible server operations.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

/// Why the multiplexer refused a registration.
///
/// `Duplicate` is the only kind the group layer itself cares about — it is
/// what a failure hook observes when the same method+path pattern is
/// registered twice. `Invalid` passes through from pattern parsing
/// unmodified (bad method token, malformed path template).
#[derive(Debug)]
pub enum RegisterError {
    /// The exact pattern is already registered on this multiplexer.
    Duplicate { pattern: String },
    /// The pattern could not be parsed or inserted.
    Invalid { pattern: String, reason: String },
}

impl RegisterError {
    /// The fully-qualified pattern the registration was attempted under.
    pub fn pattern(&self) -> &str {
        match self {
            Self::Duplicate { pattern } | Self::Invalid { pattern, .. } => pattern,
        }
    }
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate { pattern } => {
                write!(f, "pattern `{pattern}` is already registered")
            }
            Self::Invalid { pattern, reason } => {
                write!(f, "invalid pattern `{pattern}`: {reason}")
            }
        }
    }
}

impl std::error::Error for RegisterError {}
