//! Unified error type.

use std::fmt;

/// The error type returned by zonal's fallible operations.
///
/// Only infrastructure can fail: binding the listener or accepting a
/// connection. Application-level failures are expressed as HTTP
/// [`Response`](crate::Response) values, and the middleware layer itself has
/// no error path at all — resolution failures degrade to configured defaults.
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
