//! Logging subscriber setup.
//!
//! Wraps `tracing-subscriber` with the two output shapes the harness uses:
//! JSON lines for CI log collection and pretty output for local runs.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable consulted before [`LogConfig::level`].
pub const LOG_ENV_VAR: &str = "SKIFF_LOG";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "skiff_config=debug").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Whether to write through the libtest output capture.
    pub test_writer: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            include_target: true,
            test_writer: false,
        }
    }
}

impl LogConfig {
    /// Human-readable output at debug level.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            ..Self::default()
        }
    }

    /// Compact output captured per test.
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "skiff=debug,skiff_config=debug,skiff_tls=debug,skiff_test=debug,warn"
                .to_string(),
            json_format: false,
            include_target: true,
            test_writer: true,
            ..Self::default()
        }
    }

    /// Override the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// Installs the global subscriber described by `config`.
///
/// The `SKIFF_LOG` environment variable, when set, takes precedence over
/// `config.level`.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = match std::env::var(LOG_ENV_VAR) {
        Ok(directive) if !directive.is_empty() => create_env_filter(&directive)?,
        _ => create_env_filter(&config.level)?,
    };

    let installed = if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(config.include_target);
        if config.test_writer {
            tracing_subscriber::registry()
                .with(fmt_layer.with_test_writer().with_filter(filter))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(fmt_layer.with_filter(filter))
                .try_init()
        }
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(config.include_target);
        if config.test_writer {
            tracing_subscriber::registry()
                .with(fmt_layer.with_test_writer().with_filter(filter))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(fmt_layer.with_filter(filter))
                .try_init()
        }
    };

    installed.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Installs [`LogConfig::test`] once per process.
///
/// Later calls, or a subscriber installed elsewhere, are not an error.
pub fn init_test_logging() {
    let _ = init_logging(&LogConfig::test());
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns error if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}
