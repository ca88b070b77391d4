//! Error types for request resolution
//!
//! Every failure inside the request pipeline ends up as one of these
//! variants, which the router maps onto a status code.

use std::io;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, ServeError>;

#[derive(Error, Debug)]
pub enum ServeError {
    /// Requested path does not exist under the root (404)
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Range header could not be satisfied against the resource size (416)
    #[error("range not satisfiable for resource of {size} bytes")]
    RangeNotSatisfiable { size: u64 },

    /// Any other I/O failure during resolution or listing (500)
    #[error("I/O error: {0}")]
    Fault(#[from] io::Error),

    /// Directory listing template failed to render (500)
    #[error("render error: {0}")]
    Render(#[from] minijinja::Error),
}

impl ServeError {
    /// Classify an I/O error raised while looking up `path`.
    ///
    /// Only a missing entry becomes `NotFound`; permissions and the rest are faults.
    pub fn from_lookup(err: io::Error, path: &str) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_string(),
            }
        } else {
            Self::Fault(err)
        }
    }

    /// HTTP status code this error maps to
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::RangeNotSatisfiable { .. } => 416,
            Self::Fault(_) | Self::Render(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_classification() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            ServeError::from_lookup(missing, "/a.txt"),
            ServeError::NotFound { ref path } if path == "/a.txt"
        ));

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert!(matches!(
            ServeError::from_lookup(denied, "/a.txt"),
            ServeError::Fault(_)
        ));
    }

    #[test]
    fn test_status_mapping() {
        let not_found = ServeError::NotFound {
            path: "/x".to_string(),
        };
        assert_eq!(not_found.status(), 404);
        assert_eq!(ServeError::RangeNotSatisfiable { size: 10 }.status(), 416);
        let fault = ServeError::Fault(io::Error::other("disk"));
        assert_eq!(fault.status(), 500);
    }
}
