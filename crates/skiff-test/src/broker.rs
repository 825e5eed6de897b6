//! Running embedded broker handle.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use skiff_config::{BrokerConfigBuilder, RenderedConfig, SecurityProtocol, LISTENER_HOST};

use crate::{HarnessError, NodeLauncher, NodeProcess};

/// A single broker started for a test.
///
/// Dropping the handle stops the broker and deletes its log directory.
/// Call [`close`](Self::close) to observe shutdown errors instead of having
/// them logged.
pub struct EmbeddedBroker {
    config: RenderedConfig,
    node_id: i32,
    process: Option<Box<dyn NodeProcess>>,
}

impl fmt::Debug for EmbeddedBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedBroker")
            .field("node_id", &self.node_id)
            .field("log_dir", &self.config.log_dir())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl EmbeddedBroker {
    /// Start a broker for an already rendered configuration.
    ///
    /// # Errors
    ///
    /// Returns `Launch` if the configuration lacks a node id or the
    /// launcher fails.
    pub fn start(config: RenderedConfig, launcher: &dyn NodeLauncher) -> Result<Self, HarnessError> {
        let node_id = config
            .node_id()
            .ok_or_else(|| HarnessError::launch("configuration has no node id"))?;
        let process = launcher.launch(&config)?;

        tracing::info!(
            node_id,
            listeners = config.get(skiff_config::keys::LISTENERS).unwrap_or_default(),
            "embedded broker started"
        );

        Ok(Self {
            config,
            node_id,
            process: Some(process),
        })
    }

    /// The broker's node id.
    pub fn node_id(&self) -> i32 {
        self.node_id
    }

    /// The configuration the broker was started with.
    pub fn config(&self) -> &RenderedConfig {
        &self.config
    }

    /// The broker's log directory.
    pub fn log_dir(&self) -> Option<&Path> {
        self.config.log_dir()
    }

    /// `localhost:port` of the plaintext listener, if it is bound.
    pub fn plaintext_addr(&self) -> Option<String> {
        self.addr(SecurityProtocol::Plaintext)
    }

    /// `localhost:port` of the SSL listener, if it is bound.
    pub fn ssl_addr(&self) -> Option<String> {
        self.addr(SecurityProtocol::Ssl)
    }

    fn addr(&self, protocol: SecurityProtocol) -> Option<String> {
        let port = self.process.as_ref()?.bound_port(protocol)?;
        Some(format!("{LISTENER_HOST}:{port}"))
    }

    /// Whether the broker has not been closed yet.
    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    /// Stop the broker and delete its log directory.
    ///
    /// Calling this on an already closed broker does nothing. If shutdown
    /// fails the broker stays running and `close` may be called again.
    ///
    /// # Errors
    ///
    /// Returns `Shutdown` if the broker does not stop, or `Io` if the log
    /// directory cannot be removed.
    pub fn close(&mut self) -> Result<(), HarnessError> {
        let Some(mut process) = self.process.take() else {
            return Ok(());
        };
        if let Err(e) = process.shutdown() {
            // Keep the handle so a later close can retry.
            self.process = Some(process);
            return Err(e);
        }

        if let Some(log_dir) = self.config.log_dir() {
            match fs::remove_dir_all(log_dir) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
                _ => {}
            }
        }

        tracing::info!(node_id = self.node_id, "embedded broker stopped");
        Ok(())
    }
}

impl Drop for EmbeddedBroker {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(node_id = self.node_id, error = %e, "failed to stop embedded broker");
        }
    }
}

/// Start a broker straight from a builder.
pub trait BuildBroker {
    /// Finalize the configuration and launch a broker with it.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the configuration is invalid, or any error from
    /// [`EmbeddedBroker::start`].
    fn build(&mut self, launcher: &dyn NodeLauncher) -> Result<EmbeddedBroker, HarnessError>;
}

impl BuildBroker for BrokerConfigBuilder {
    fn build(&mut self, launcher: &dyn NodeLauncher) -> Result<EmbeddedBroker, HarnessError> {
        let config = self.build_config()?;
        EmbeddedBroker::start(config, launcher)
    }
}
