//! Broker configuration builder.
//!
//! [`BrokerConfigBuilder`] accumulates options for one embedded broker and
//! turns them into a [`RenderedConfig`]. Setters never validate; everything
//! is checked when [`build_config`](BrokerConfigBuilder::build_config) runs:
//!
//! 1. **Defaults**: a missing log directory is allocated.
//! 2. **Validation**: at least one listener, a log directory and a
//!    coordination endpoint must be present.
//! 3. **Rendering**: listeners and flat settings are written out, and TLS
//!    material is generated when a trust store or a fixed SSL port is set.
//!
//! # Example
//!
//! ```no_run
//! use skiff_config::{BrokerConfigBuilder, SecurityProtocol};
//!
//! # fn main() -> Result<(), skiff_config::BrokerConfigError> {
//! let config = BrokerConfigBuilder::new()
//!     .coordination_endpoint("localhost:2181")
//!     .enable(SecurityProtocol::Plaintext)?
//!     .rack("r1")
//!     .build_config()?;
//!
//! assert_eq!(config.get("listeners"), Some("PLAINTEXT://localhost:0"));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use skiff_tls::{MaterialRequest, PemMaterialGenerator, SecurityMaterialGenerator};

use crate::rendered::{Listener, LISTENER_SEPARATOR};
use crate::{
    keys, BrokerConfigError, CoordinationEndpoint, HarnessSettings, RenderedConfig,
    SecurityProtocol, SystemTempDirs, TempDirAllocator,
};

/// Port value meaning "listener disabled".
pub const PORT_DISABLED: i32 = -1;

/// Port value meaning "listener enabled on an OS-assigned port".
pub const PORT_EPHEMERAL: i32 = 0;

/// Default replica/controller socket timeout.
pub const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 1500;

/// Default backoff between controlled shutdown attempts.
pub const DEFAULT_CONTROLLED_SHUTDOWN_RETRY_BACKOFF_MS: u64 = 100;

/// Default log cleaner dedupe buffer (2 MiB).
pub const DEFAULT_LOG_CLEANER_DEDUPE_BUFFER_SIZE: u64 = 2 * 1024 * 1024;

/// Prefix of the certificate alias; the node id is appended.
pub const SERVER_ALIAS_PREFIX: &str = "server";

/// Offsets topic replication factor for a single-node cluster.
const OFFSETS_TOPIC_REPLICATION_FACTOR: &str = "1";

static NODE_ID_COUNTER: AtomicI32 = AtomicI32::new(0);

/// Returns the next process-wide node id, starting at 1.
///
/// Every [`BrokerConfigBuilder::new`] draws from this counter, so builders
/// created concurrently from different threads never share an id.
pub fn next_node_id() -> i32 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1
}

/// Fluent builder for an embedded broker's configuration.
///
/// Setters take `&mut self` and return it for chaining. The builder is not
/// consumed by [`build_config`](Self::build_config): calling it again
/// re-renders the same state, reusing any log directory allocated the first
/// time.
pub struct BrokerConfigBuilder {
    node_id: i32,
    coordination_endpoint: Option<String>,
    log_dir: Option<PathBuf>,
    plaintext_port: i32,
    ssl_port: i32,
    trust_store: Option<PathBuf>,
    socket_timeout_ms: u64,
    controlled_shutdown: bool,
    controlled_shutdown_retry_backoff_ms: u64,
    delete_topic: bool,
    log_cleaner: bool,
    log_cleaner_dedupe_buffer_size: u64,
    rack: Option<String>,
    temp_dirs: Arc<dyn TempDirAllocator>,
    security_material: Arc<dyn SecurityMaterialGenerator>,
}

impl Default for BrokerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BrokerConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerConfigBuilder")
            .field("node_id", &self.node_id)
            .field("coordination_endpoint", &self.coordination_endpoint)
            .field("log_dir", &self.log_dir)
            .field("plaintext_port", &self.plaintext_port)
            .field("ssl_port", &self.ssl_port)
            .field("trust_store", &self.trust_store)
            .field("socket_timeout_ms", &self.socket_timeout_ms)
            .field("controlled_shutdown", &self.controlled_shutdown)
            .field(
                "controlled_shutdown_retry_backoff_ms",
                &self.controlled_shutdown_retry_backoff_ms,
            )
            .field("delete_topic", &self.delete_topic)
            .field("log_cleaner", &self.log_cleaner)
            .field(
                "log_cleaner_dedupe_buffer_size",
                &self.log_cleaner_dedupe_buffer_size,
            )
            .field("rack", &self.rack)
            .finish_non_exhaustive()
    }
}

impl BrokerConfigBuilder {
    /// Creates a builder with the next process-wide node id and defaults.
    pub fn new() -> Self {
        Self {
            node_id: next_node_id(),
            coordination_endpoint: None,
            log_dir: None,
            plaintext_port: PORT_DISABLED,
            ssl_port: PORT_DISABLED,
            trust_store: None,
            socket_timeout_ms: DEFAULT_SOCKET_TIMEOUT_MS,
            controlled_shutdown: false,
            controlled_shutdown_retry_backoff_ms: DEFAULT_CONTROLLED_SHUTDOWN_RETRY_BACKOFF_MS,
            delete_topic: false,
            log_cleaner: false,
            log_cleaner_dedupe_buffer_size: DEFAULT_LOG_CLEANER_DEDUPE_BUFFER_SIZE,
            rack: None,
            temp_dirs: Arc::new(SystemTempDirs::default()),
            security_material: Arc::new(PemMaterialGenerator::new()),
        }
    }

    /// Set the node id.
    pub fn node_id(&mut self, node_id: i32) -> &mut Self {
        self.node_id = node_id;
        self
    }

    /// Set the coordination service connection string.
    pub fn coordination_endpoint(&mut self, endpoint: impl Into<String>) -> &mut Self {
        self.coordination_endpoint = Some(endpoint.into());
        self
    }

    /// Set the coordination endpoint from a running service handle.
    pub fn coordination_service<E>(&mut self, service: &E) -> &mut Self
    where
        E: CoordinationEndpoint + ?Sized,
    {
        self.coordination_endpoint(service.connection_string())
    }

    /// Set the log directory.
    pub fn log_dir(&mut self, log_dir: impl Into<PathBuf>) -> &mut Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    /// Enable a listener for `protocol` on an OS-assigned port.
    ///
    /// # Errors
    ///
    /// Returns `BrokerConfigError::InvalidArgument` for protocols the
    /// builder has no listener for.
    pub fn enable(&mut self, protocol: SecurityProtocol) -> Result<&mut Self, BrokerConfigError> {
        match protocol {
            SecurityProtocol::Plaintext => Ok(self.enable_plaintext()),
            SecurityProtocol::Ssl => Ok(self.enable_ssl()),
            other => Err(BrokerConfigError::invalid_argument(format!(
                "unhandled: {other}"
            ))),
        }
    }

    /// Set the plaintext port. Negative disables the listener.
    pub fn plaintext_port(&mut self, port: i32) -> &mut Self {
        self.plaintext_port = port;
        self
    }

    /// Enable plaintext by setting its port to 0.
    pub fn enable_plaintext(&mut self) -> &mut Self {
        self.plaintext_port(PORT_EPHEMERAL)
    }

    /// Set the SSL port. Negative disables the listener.
    pub fn ssl_port(&mut self, port: i32) -> &mut Self {
        self.ssl_port = port;
        self
    }

    /// Enable SSL by setting its port to 0.
    ///
    /// Port 0 alone does not generate security material; pair it with
    /// [`trust_store`](Self::trust_store) for a working TLS listener.
    pub fn enable_ssl(&mut self) -> &mut Self {
        self.ssl_port(PORT_EPHEMERAL)
    }

    /// Set the trust store shared with other brokers and clients.
    pub fn trust_store(&mut self, trust_store: impl Into<PathBuf>) -> &mut Self {
        self.trust_store = Some(trust_store.into());
        self
    }

    /// Set the replica and controller socket timeout.
    pub fn socket_timeout_ms(&mut self, socket_timeout_ms: u64) -> &mut Self {
        self.socket_timeout_ms = socket_timeout_ms;
        self
    }

    /// Enable or disable controlled shutdown.
    pub fn enable_controlled_shutdown(&mut self, enable: bool) -> &mut Self {
        self.controlled_shutdown = enable;
        self
    }

    /// Set the controlled shutdown retry backoff.
    pub fn controlled_shutdown_retry_backoff_ms(&mut self, backoff_ms: u64) -> &mut Self {
        self.controlled_shutdown_retry_backoff_ms = backoff_ms;
        self
    }

    /// Enable or disable topic deletion.
    pub fn enable_delete_topic(&mut self, enable: bool) -> &mut Self {
        self.delete_topic = enable;
        self
    }

    /// Enable or disable the log cleaner.
    pub fn enable_log_cleaner(&mut self, enable: bool) -> &mut Self {
        self.log_cleaner = enable;
        self
    }

    /// Set the log cleaner dedupe buffer size in bytes.
    pub fn log_cleaner_dedupe_buffer_size(&mut self, size: u64) -> &mut Self {
        self.log_cleaner_dedupe_buffer_size = size;
        self
    }

    /// Set the rack id.
    pub fn rack(&mut self, rack: impl Into<String>) -> &mut Self {
        self.rack = Some(rack.into());
        self
    }

    /// Replace the log directory allocator.
    pub fn with_temp_dirs(&mut self, temp_dirs: Arc<dyn TempDirAllocator>) -> &mut Self {
        self.temp_dirs = temp_dirs;
        self
    }

    /// Replace the security material generator.
    pub fn with_security_material(
        &mut self,
        generator: Arc<dyn SecurityMaterialGenerator>,
    ) -> &mut Self {
        self.security_material = generator;
        self
    }

    /// Overlay every field `settings` sets.
    pub fn apply_settings(&mut self, settings: &HarnessSettings) -> &mut Self {
        if let Some(timeout) = settings.socket_timeout_ms {
            self.socket_timeout_ms(timeout);
        }
        if let Some(enable) = settings.controlled_shutdown {
            self.enable_controlled_shutdown(enable);
        }
        if let Some(backoff) = settings.controlled_shutdown_retry_backoff_ms {
            self.controlled_shutdown_retry_backoff_ms(backoff);
        }
        if let Some(enable) = settings.delete_topic {
            self.enable_delete_topic(enable);
        }
        if let Some(enable) = settings.log_cleaner {
            self.enable_log_cleaner(enable);
        }
        if let Some(size) = settings.log_cleaner_dedupe_buffer_size {
            self.log_cleaner_dedupe_buffer_size(size);
        }
        if let Some(rack) = &settings.rack {
            self.rack(rack.clone());
        }
        if let Some(endpoint) = &settings.coordination_endpoint {
            self.coordination_endpoint(endpoint.clone());
        }
        self
    }

    /// The node id this builder will render.
    pub fn assigned_node_id(&self) -> i32 {
        self.node_id
    }

    /// The log directory, once set or allocated.
    pub fn resolved_log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }

    /// Apply defaults, validate and render the configuration.
    ///
    /// Defaults run first, so a log directory allocated here stays on disk
    /// (and on the builder) even when validation then fails. Callers that
    /// own the allocator should remove [`resolved_log_dir`](Self::resolved_log_dir).
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if no listener is enabled or the
    ///   coordination endpoint is missing.
    /// - `Io` if a log directory has to be allocated and that fails.
    /// - `IllegalState` if security material generation fails.
    pub fn build_config(&mut self) -> Result<RenderedConfig, BrokerConfigError> {
        self.apply_defaults()?;
        let (log_dir, coordination_endpoint) = self.validate()?;

        let listeners = self.listeners();
        let log_dir = absolute(log_dir)?;

        let mut props = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            props.insert(key.to_string(), value);
        };
        put(keys::BROKER_ID, self.node_id.to_string());
        put(keys::LISTENERS, listeners.clone());
        put(keys::LOG_DIR, log_dir.display().to_string());
        put(keys::ZOOKEEPER_CONNECT, coordination_endpoint.to_string());
        put(
            keys::REPLICA_SOCKET_TIMEOUT_MS,
            self.socket_timeout_ms.to_string(),
        );
        put(
            keys::CONTROLLER_SOCKET_TIMEOUT_MS,
            self.socket_timeout_ms.to_string(),
        );
        put(
            keys::CONTROLLED_SHUTDOWN_ENABLE,
            self.controlled_shutdown.to_string(),
        );
        put(keys::DELETE_TOPIC_ENABLE, self.delete_topic.to_string());
        put(
            keys::CONTROLLED_SHUTDOWN_RETRY_BACKOFF_MS,
            self.controlled_shutdown_retry_backoff_ms.to_string(),
        );
        put(
            keys::LOG_CLEANER_DEDUPE_BUFFER_SIZE,
            self.log_cleaner_dedupe_buffer_size.to_string(),
        );
        put(keys::LOG_CLEANER_ENABLE, self.log_cleaner.to_string());
        put(
            keys::OFFSETS_TOPIC_REPLICATION_FACTOR,
            OFFSETS_TOPIC_REPLICATION_FACTOR.to_string(),
        );
        put(keys::SSL_ENDPOINT_IDENTIFICATION_ALGORITHM, String::new());
        if let Some(rack) = &self.rack {
            put(keys::BROKER_RACK, rack.clone());
        }

        // Port 0 alone is not enough: only an explicit trust store or a
        // fixed SSL port triggers material generation.
        if self.trust_store.is_some() || self.ssl_port > 0 {
            let request = MaterialRequest::server(format!("{SERVER_ALIAS_PREFIX}{}", self.node_id))
                .with_trust_store(self.trust_store.clone());
            let ssl = self
                .security_material
                .generate(&request)
                .map_err(BrokerConfigError::illegal_state)?;
            props.extend(ssl);
            props.insert(
                keys::INTER_BROKER_SECURITY_PROTOCOL.to_string(),
                SecurityProtocol::Ssl.name().to_string(),
            );
            tracing::info!(
                node_id = self.node_id,
                alias = %request.alias,
                "generated security material for broker"
            );
        }

        tracing::debug!(
            node_id = self.node_id,
            listeners = %listeners,
            log_dir = %log_dir.display(),
            "rendered broker configuration"
        );

        Ok(RenderedConfig::new(props))
    }

    fn apply_defaults(&mut self) -> Result<(), BrokerConfigError> {
        if self.log_dir.is_none() {
            let dir = self.temp_dirs.allocate()?;
            tracing::debug!(node_id = self.node_id, log_dir = %dir.display(), "allocated log directory");
            self.log_dir = Some(dir);
        }
        Ok(())
    }

    // Reports the first violated invariant only.
    fn validate(&self) -> Result<(&Path, &str), BrokerConfigError> {
        if self.plaintext_port < 0 && self.ssl_port < 0 {
            return Err(BrokerConfigError::invalid_configuration(
                "at least one protocol must be used",
            ));
        }
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Err(BrokerConfigError::invalid_configuration(
                "storage directory must be specified",
            ));
        };
        let Some(endpoint) = self.coordination_endpoint.as_deref() else {
            return Err(BrokerConfigError::invalid_configuration(
                "coordination endpoint must be specified",
            ));
        };
        Ok((log_dir, endpoint))
    }

    fn listeners(&self) -> String {
        [
            (SecurityProtocol::Plaintext, self.plaintext_port),
            (SecurityProtocol::Ssl, self.ssl_port),
        ]
        .into_iter()
        .filter(|(_, port)| *port >= 0)
        .map(|(protocol, port)| Listener::localhost(protocol, port).to_string())
        .collect::<Vec<_>>()
        .join(LISTENER_SEPARATOR)
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
