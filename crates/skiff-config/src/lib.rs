//! Configuration for embedded single-node test brokers.
//!
//! This crate turns a handful of test-level intents ("give me a plaintext
//! listener", "use this shared trust store") into the exact key/value
//! configuration a broker expects:
//!
//! - [`BrokerConfigBuilder`] - fluent option accumulator with defaulting,
//!   validation and rendering
//! - [`RenderedConfig`] - the immutable result handed to the broker
//! - [`SettingsLoader`] / [`HarnessSettings`] - suite-wide defaults from
//!   TOML/JSON files and `SKIFF__*` environment variables
//! - [`TempDirAllocator`], [`CoordinationEndpoint`] - collaborator seams
//!
//! # Example
//!
//! ```no_run
//! use skiff_config::{keys, BrokerConfigBuilder};
//!
//! # fn main() -> Result<(), skiff_config::BrokerConfigError> {
//! let config = BrokerConfigBuilder::new()
//!     .coordination_endpoint("localhost:2181")
//!     .enable_plaintext()
//!     .ssl_port(9093)
//!     .trust_store("/tmp/shared/truststore.pem")
//!     .build_config()?;
//!
//! assert_eq!(
//!     config.get(keys::LISTENERS),
//!     Some("PLAINTEXT://localhost:0,SSL://localhost:9093")
//! );
//! assert_eq!(config.get(keys::INTER_BROKER_SECURITY_PROTOCOL), Some("SSL"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod endpoint;
mod error;
pub mod keys;
mod protocol;
mod rendered;
mod settings;
mod temp;

pub use builder::{
    next_node_id, BrokerConfigBuilder, DEFAULT_CONTROLLED_SHUTDOWN_RETRY_BACKOFF_MS,
    DEFAULT_LOG_CLEANER_DEDUPE_BUFFER_SIZE, DEFAULT_SOCKET_TIMEOUT_MS, PORT_DISABLED,
    PORT_EPHEMERAL, SERVER_ALIAS_PREFIX,
};
pub use endpoint::CoordinationEndpoint;
pub use error::{BrokerConfigError, SettingsError};
pub use protocol::SecurityProtocol;
pub use rendered::{Listener, RenderedConfig, LISTENER_HOST, LISTENER_SEPARATOR};
pub use settings::{HarnessSettings, SettingsLoader};
pub use temp::{SystemTempDirs, TempDirAllocator, DEFAULT_LOG_DIR_PREFIX};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_starts_disabled() {
        let mut builder = BrokerConfigBuilder::new();
        builder.coordination_endpoint("localhost:2181");
        let err = builder.build_config().unwrap_err();
        assert!(err.is_invalid_configuration());
        std::fs::remove_dir_all(builder.resolved_log_dir().unwrap()).unwrap();
    }
}
