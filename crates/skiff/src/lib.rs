//! # Skiff
//!
//! **Embedded single-node brokers for integration tests**
//!
//! Skiff turns a few test-level intents into a complete broker
//! configuration and manages the broker for the duration of a test:
//!
//! - **Configuration** - fluent builder with process-unique node ids,
//!   temporary log directories and validation
//! - **Security material** - self-signed certificates appended to a trust
//!   store shared across the brokers of a test
//! - **Lifecycle** - broker handles that stop the node and clean up on drop
//! - **Logging** - `tracing` subscriber setup for test binaries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skiff::prelude::*;
//!
//! #[test]
//! fn round_trip() -> Result<(), HarnessError> {
//!     init_test_logging();
//!
//!     let launcher = CommandLauncher::new("/opt/broker/bin/server-start.sh");
//!     let broker = BrokerConfigBuilder::new()
//!         .coordination_endpoint("localhost:2181")
//!         .plaintext_port(19092)
//!         .build(&launcher)?;
//!
//!     assert_eq!(broker.plaintext_addr().as_deref(), Some("localhost:19092"));
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/skiff/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export configuration types
pub use skiff_config as config;

// Re-export security material types
pub use skiff_tls as tls;

// Re-export logging setup
pub use skiff_telemetry as telemetry;

// Re-export broker handles
pub use skiff_test as harness;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use skiff::prelude::*;
/// ```
pub mod prelude {
    pub use skiff_config::{
        keys, BrokerConfigBuilder, BrokerConfigError, CoordinationEndpoint, HarnessSettings,
        RenderedConfig, SecurityProtocol, SettingsLoader, TempDirAllocator,
    };

    pub use skiff_tls::{MaterialRequest, PemMaterialGenerator, SecurityMaterialGenerator};

    pub use skiff_telemetry::{init_logging, init_test_logging, LogConfig};

    pub use skiff_test::{
        BuildBroker, CommandLauncher, EmbeddedBroker, HarnessError, NodeLauncher, NodeProcess,
        init_logging_from_settings,
    };
}
