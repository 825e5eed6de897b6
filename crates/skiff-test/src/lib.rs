//! # Skiff Test
//!
//! Embedded single-node brokers for integration tests.
//!
//! A test configures a [`BrokerConfigBuilder`](skiff_config::BrokerConfigBuilder),
//! then hands the rendered configuration to a [`NodeLauncher`]. The returned
//! [`EmbeddedBroker`] stops the node and removes its log directory when it
//! goes out of scope.
//!
//! ## Example
//!
//! ```rust,ignore
//! use skiff_config::BrokerConfigBuilder;
//! use skiff_test::{BuildBroker, CommandLauncher};
//!
//! #[test]
//! fn produces_to_broker() {
//!     skiff_test::init_test_logging();
//!
//!     let launcher = CommandLauncher::new("/opt/broker/bin/server-start.sh");
//!     let broker = BrokerConfigBuilder::new()
//!         .coordination_endpoint("localhost:2181")
//!         .plaintext_port(19092)
//!         .build(&launcher)
//!         .unwrap();
//!
//!     assert_eq!(broker.plaintext_addr().as_deref(), Some("localhost:19092"));
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod broker;
mod error;
mod launcher;
mod logging;

pub use broker::{BuildBroker, EmbeddedBroker};
pub use error::HarnessError;
pub use launcher::{CommandLauncher, NodeLauncher, NodeProcess};
pub use logging::{init_logging_from_settings, test_log_config};
pub use skiff_telemetry::init_test_logging;
