//! Broker configuration keys.
//!
//! These names are parsed by the broker itself and must not change.

/// Numeric broker identifier.
pub const BROKER_ID: &str = "broker.id";

/// Comma-separated listener list.
pub const LISTENERS: &str = "listeners";

/// Directory holding the broker's log segments.
pub const LOG_DIR: &str = "log.dir";

/// Coordination service connection string.
pub const ZOOKEEPER_CONNECT: &str = "zookeeper.connect";

/// Socket timeout for replica fetchers.
pub const REPLICA_SOCKET_TIMEOUT_MS: &str = "replica.socket.timeout.ms";

/// Socket timeout for controller-to-broker channels.
pub const CONTROLLER_SOCKET_TIMEOUT_MS: &str = "controller.socket.timeout.ms";

/// Whether the broker migrates leadership before stopping.
pub const CONTROLLED_SHUTDOWN_ENABLE: &str = "controlled.shutdown.enable";

/// Backoff between controlled shutdown attempts.
pub const CONTROLLED_SHUTDOWN_RETRY_BACKOFF_MS: &str = "controlled.shutdown.retry.backoff.ms";

/// Whether topics may be deleted.
pub const DELETE_TOPIC_ENABLE: &str = "delete.topic.enable";

/// Memory for log cleaner deduplication.
pub const LOG_CLEANER_DEDUPE_BUFFER_SIZE: &str = "log.cleaner.dedupe.buffer.size";

/// Whether the background log cleaner runs.
pub const LOG_CLEANER_ENABLE: &str = "log.cleaner.enable";

/// Replication factor of the internal offsets topic.
pub const OFFSETS_TOPIC_REPLICATION_FACTOR: &str = "offsets.topic.replication.factor";

/// Hostname verification algorithm; empty disables it.
pub const SSL_ENDPOINT_IDENTIFICATION_ALGORITHM: &str = "ssl.endpoint.identification.algorithm";

/// Rack the broker belongs to.
pub const BROKER_RACK: &str = "broker.rack";

/// Protocol used between brokers.
pub const INTER_BROKER_SECURITY_PROTOCOL: &str = "security.inter.broker.protocol";
