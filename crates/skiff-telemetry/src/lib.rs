//! Structured logging for Skiff test harnesses.
//!
//! Builders and broker handles emit `tracing` events; this crate installs a
//! subscriber for them. Test binaries normally call [`init_test_logging`],
//! which routes output through the libtest capture and is safe to call from
//! every test.
//!
//! # Example
//!
//! ```rust,ignore
//! use skiff_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(node_id = 1, "broker configured");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, init_test_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
