//! Test subscriber setup driven by harness settings.

use skiff_config::HarnessSettings;
use skiff_telemetry::{init_logging, LogConfig, TelemetryResult};

/// [`LogConfig::test`] with the filter replaced by `settings.log_level`.
pub fn test_log_config(settings: &HarnessSettings) -> LogConfig {
    match &settings.log_level {
        Some(level) => LogConfig::test().with_level(level.clone()),
        None => LogConfig::test(),
    }
}

/// Install the test subscriber using the suite's log level.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if `log_level` is not a valid
/// filter or another subscriber is already installed.
pub fn init_logging_from_settings(settings: &HarnessSettings) -> TelemetryResult<()> {
    init_logging(&test_log_config(settings))
}
