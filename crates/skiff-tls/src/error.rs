//! TLS material error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing security material.
#[derive(Error, Debug)]
pub enum TlsError {
    /// Key or certificate generation failed.
    #[error("failed to generate certificate: {0}")]
    Generation(#[from] rcgen::Error),

    /// Reading or writing a store file failed.
    #[error("failed to access {path}")]
    Io {
        /// Path of the store file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl TlsError {
    /// Create a new I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = TlsError::io(
            "/tmp/truststore.pem",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/truststore.pem"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
