//! Harness error types.

use skiff_config::BrokerConfigError;
use thiserror::Error;

/// Errors that can occur while running an embedded broker.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The broker configuration could not be finalized.
    #[error(transparent)]
    Config(#[from] BrokerConfigError),

    /// The broker failed to start.
    #[error("failed to launch broker: {message}")]
    Launch {
        /// What went wrong.
        message: String,
        /// Underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The broker failed to stop cleanly.
    #[error("failed to shut down broker: {0}")]
    Shutdown(String),

    /// Filesystem cleanup failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Creates a launch error with a message.
    pub fn launch(message: impl Into<String>) -> Self {
        Self::Launch {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a launch error with a source.
    pub fn launch_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Launch {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a shutdown error.
    pub fn shutdown(message: impl Into<String>) -> Self {
        Self::Shutdown(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_transparent() {
        let err: HarnessError =
            BrokerConfigError::invalid_configuration("at least one protocol must be used").into();
        assert_eq!(
            err.to_string(),
            "invalid configuration: at least one protocol must be used"
        );
    }

    #[test]
    fn test_launch_with_source() {
        let err = HarnessError::launch_with_source(
            "spawn failed",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such binary"),
        );
        assert!(err.to_string().contains("spawn failed"));
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("no such binary"));
    }

    #[test]
    fn test_shutdown_error() {
        let err = HarnessError::shutdown("still running");
        assert_eq!(err.to_string(), "failed to shut down broker: still running");
    }
}
