//! Configuration error types.

use std::path::PathBuf;

use skiff_tls::TlsError;
use thiserror::Error;

/// Errors returned while finalizing a broker configuration.
#[derive(Error, Debug)]
pub enum BrokerConfigError {
    /// The caller passed a value the builder cannot act on.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the misuse.
        message: String,
    },

    /// The accumulated options are not a usable configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Which invariant was violated.
        reason: String,
    },

    /// Security material could not be generated.
    #[error("failed to generate security material")]
    IllegalState {
        /// Underlying generator failure.
        #[source]
        source: TlsError,
    },

    /// Preparing the storage directory failed.
    #[error("I/O error while preparing broker storage: {0}")]
    Io(#[from] std::io::Error),
}

impl BrokerConfigError {
    /// Create a new invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new invalid configuration error.
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Wrap a security material failure.
    pub fn illegal_state(source: TlsError) -> Self {
        Self::IllegalState { source }
    }

    /// Whether this is an [`InvalidArgument`](Self::InvalidArgument) error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Whether this is an [`InvalidConfiguration`](Self::InvalidConfiguration) error.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// Whether this is an [`IllegalState`](Self::IllegalState) error.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState { .. })
    }
}

/// Errors that can occur while loading harness settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file not found.
    #[error("settings file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read settings file.
    #[error("failed to read settings file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML settings: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON settings: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The file extension or format name is not supported.
    #[error("unsupported settings format: {0}")]
    UnsupportedFormat(String),

    /// Environment variable parsing error.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Explanation of the parsing error.
        reason: String,
    },
}

impl SettingsError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new environment variable parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_error() {
        let err = BrokerConfigError::invalid_configuration("at least one protocol must be used");
        assert!(err.is_invalid_configuration());
        assert!(err
            .to_string()
            .contains("at least one protocol must be used"));
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = BrokerConfigError::invalid_argument("unhandled: SASL_SSL");
        assert!(err.is_invalid_argument());
        assert!(!err.is_illegal_state());
        assert!(err.to_string().contains("SASL_SSL"));
    }

    #[test]
    fn test_illegal_state_keeps_source() {
        let cause = TlsError::io(
            "/nope/truststore.pem",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let err = BrokerConfigError::illegal_state(cause);
        assert!(err.is_illegal_state());

        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("/nope/truststore.pem"));
    }

    #[test]
    fn test_env_parse_error() {
        let err = SettingsError::env_parse_error("SKIFF__SOCKET_TIMEOUT_MS", "expected integer");
        assert!(err.to_string().contains("SKIFF__SOCKET_TIMEOUT_MS"));
        assert!(err.to_string().contains("expected integer"));
    }

    #[test]
    fn test_file_not_found_error() {
        let err = SettingsError::file_not_found("/path/to/skiff.toml");
        assert!(err.to_string().contains("/path/to/skiff.toml"));
    }
}
