//! Embedded broker lifecycle tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use skiff_config::{keys, BrokerConfigBuilder, RenderedConfig, SecurityProtocol};
use skiff_test::{BuildBroker, EmbeddedBroker, HarnessError, NodeLauncher, NodeProcess};

#[derive(Default)]
struct Counters {
    launched: AtomicUsize,
    stopped: AtomicUsize,
    failing_shutdowns: AtomicUsize,
}

/// Pretends to bind every listener to `base + offset`.
struct FakeLauncher {
    base_port: u16,
    counters: Arc<Counters>,
    seen: Mutex<Vec<RenderedConfig>>,
}

impl FakeLauncher {
    fn new(base_port: u16) -> Self {
        Self {
            base_port,
            counters: Arc::new(Counters::default()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

struct FakeProcess {
    ports: Vec<(SecurityProtocol, u16)>,
    counters: Arc<Counters>,
}

impl NodeLauncher for FakeLauncher {
    fn launch(&self, config: &RenderedConfig) -> Result<Box<dyn NodeProcess>, HarnessError> {
        self.counters.launched.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(config.clone());
        let ports = config
            .listeners()
            .into_iter()
            .enumerate()
            .map(|(i, l)| (l.protocol, self.base_port + i as u16))
            .collect();
        Ok(Box::new(FakeProcess {
            ports,
            counters: Arc::clone(&self.counters),
        }))
    }
}

impl NodeProcess for FakeProcess {
    fn bound_port(&self, protocol: SecurityProtocol) -> Option<u16> {
        self.ports
            .iter()
            .find(|(p, _)| *p == protocol)
            .map(|(_, port)| *port)
    }

    fn shutdown(&mut self) -> Result<(), HarnessError> {
        self.counters.stopped.fetch_add(1, Ordering::SeqCst);
        let failing = self.counters.failing_shutdowns.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |n| n.checked_sub(1),
        );
        if failing.is_ok() {
            return Err(HarnessError::shutdown("node refused to stop"));
        }
        Ok(())
    }
}

struct RefusingLauncher;

impl NodeLauncher for RefusingLauncher {
    fn launch(&self, _config: &RenderedConfig) -> Result<Box<dyn NodeProcess>, HarnessError> {
        Err(HarnessError::launch("no broker binary"))
    }
}

fn builder() -> BrokerConfigBuilder {
    let mut builder = BrokerConfigBuilder::new();
    builder.coordination_endpoint("localhost:2181");
    builder
}

#[test]
fn test_build_starts_broker_with_rendered_config() {
    skiff_test::init_test_logging();
    let launcher = FakeLauncher::new(19092);

    let mut builder = builder();
    builder.enable_plaintext();
    let broker = builder.build(&launcher).unwrap();

    assert!(broker.is_running());
    assert_eq!(broker.node_id(), builder.assigned_node_id());
    assert_eq!(broker.log_dir(), builder.resolved_log_dir());
    assert!(broker.log_dir().unwrap().is_dir());
    assert_eq!(broker.plaintext_addr().as_deref(), Some("localhost:19092"));
    assert!(broker.ssl_addr().is_none());

    let seen = launcher.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get(keys::LISTENERS), Some("PLAINTEXT://localhost:0"));
    assert_eq!(&seen[0], broker.config());
}

#[test]
fn test_close_stops_once_and_removes_log_dir() {
    let launcher = FakeLauncher::new(19100);
    let mut broker = builder().enable_plaintext().build(&launcher).unwrap();
    let log_dir = broker.log_dir().unwrap().to_path_buf();
    std::fs::write(log_dir.join("00000000.log"), b"segment").unwrap();

    broker.close().unwrap();
    broker.close().unwrap();
    drop(broker);

    assert!(!log_dir.exists());
    assert_eq!(launcher.counters.stopped.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drop_stops_broker() {
    let launcher = FakeLauncher::new(19200);
    let log_dir = {
        let broker = builder().enable_plaintext().build(&launcher).unwrap();
        broker.log_dir().unwrap().to_path_buf()
    };

    assert!(!log_dir.exists());
    assert_eq!(launcher.counters.launched.load(Ordering::SeqCst), 1);
    assert_eq!(launcher.counters.stopped.load(Ordering::SeqCst), 1);
}

#[test]
fn test_closed_broker_reports_no_addresses() {
    let launcher = FakeLauncher::new(19300);
    let mut broker = builder().enable_plaintext().build(&launcher).unwrap();
    broker.close().unwrap();

    assert!(!broker.is_running());
    assert!(broker.plaintext_addr().is_none());
}

#[test]
fn test_failed_shutdown_keeps_broker_for_retry() {
    let launcher = FakeLauncher::new(19400);
    launcher.counters.failing_shutdowns.store(1, Ordering::SeqCst);
    let mut broker = builder().enable_plaintext().build(&launcher).unwrap();
    let log_dir = broker.log_dir().unwrap().to_path_buf();

    let err = broker.close().unwrap_err();
    assert!(matches!(err, HarnessError::Shutdown(_)));
    assert!(broker.is_running());
    assert_eq!(broker.plaintext_addr().as_deref(), Some("localhost:19400"));
    // The node may still hold files, so the directory is left in place.
    assert!(log_dir.exists());

    broker.close().unwrap();
    assert!(!broker.is_running());
    assert!(!log_dir.exists());
    drop(broker);
    assert_eq!(launcher.counters.stopped.load(Ordering::SeqCst), 2);
}

#[test]
fn test_drop_retries_after_failed_close() {
    let launcher = FakeLauncher::new(19450);
    launcher.counters.failing_shutdowns.store(1, Ordering::SeqCst);
    let mut broker = builder().enable_plaintext().build(&launcher).unwrap();
    let log_dir = broker.log_dir().unwrap().to_path_buf();

    assert!(broker.close().is_err());
    drop(broker);

    assert_eq!(launcher.counters.stopped.load(Ordering::SeqCst), 2);
    assert!(!log_dir.exists());
}

#[test]
fn test_invalid_config_never_reaches_launcher() {
    let launcher = FakeLauncher::new(19500);
    let mut builder = builder();
    let err = builder.build(&launcher).unwrap_err();
    // Defaults run before validation, so a log directory was allocated.
    std::fs::remove_dir_all(builder.resolved_log_dir().unwrap()).unwrap();

    match err {
        HarnessError::Config(inner) => {
            assert!(inner.is_invalid_configuration());
            assert!(inner.to_string().contains("at least one protocol must be used"));
        }
        other => panic!("expected config error, got {other:?}"),
    }
    assert_eq!(launcher.counters.launched.load(Ordering::SeqCst), 0);
}

#[test]
fn test_launch_failure_propagates() {
    let mut builder = builder();
    let err = builder.enable_plaintext().build(&RefusingLauncher).unwrap_err();
    assert!(matches!(err, HarnessError::Launch { .. }));
    assert!(err.to_string().contains("no broker binary"));
    std::fs::remove_dir_all(builder.resolved_log_dir().unwrap()).unwrap();
}

#[test]
fn test_start_requires_node_id() {
    let launcher = FakeLauncher::new(19600);
    let err = EmbeddedBroker::start(RenderedConfig::default(), &launcher).unwrap_err();
    assert!(err.to_string().contains("no node id"));
    assert_eq!(launcher.counters.launched.load(Ordering::SeqCst), 0);
}

#[test]
fn test_secure_broker_reports_both_listeners() {
    let shared = tempfile::tempdir().unwrap();
    let launcher = FakeLauncher::new(19700);

    let broker = builder()
        .enable_plaintext()
        .ssl_port(19093)
        .trust_store(shared.path().join("truststore.pem"))
        .build(&launcher)
        .unwrap();

    assert_eq!(broker.plaintext_addr().as_deref(), Some("localhost:19700"));
    assert_eq!(broker.ssl_addr().as_deref(), Some("localhost:19701"));
    assert_eq!(
        broker.config().get(keys::INTER_BROKER_SECURITY_PROTOCOL),
        Some("SSL")
    );
    assert!(broker
        .config()
        .get(skiff_tls::keys::TRUSTSTORE_LOCATION)
        .is_some());
}

#[cfg(unix)]
mod command {
    use skiff_test::CommandLauncher;

    use super::*;

    #[test]
    fn test_command_launcher_lifecycle() {
        skiff_test::init_test_logging();
        // `sh -c <script> <name> <properties>`: the properties path lands in $1.
        let launcher = CommandLauncher::new("sh").args([
            "-c",
            "test -f \"$1\" && exec sleep 30",
            "skiff-node",
        ]);

        let mut broker = builder().plaintext_port(19092).build(&launcher).unwrap();
        let properties = broker.log_dir().unwrap().with_extension("properties");

        let written = std::fs::read_to_string(&properties).unwrap();
        assert!(written.contains("listeners=PLAINTEXT\\://localhost\\:19092\n"));
        assert_eq!(broker.plaintext_addr().as_deref(), Some("localhost:19092"));

        broker.close().unwrap();
        assert!(!properties.exists());
        assert!(!broker.config().log_dir().unwrap().exists());
    }

    #[test]
    fn test_command_launcher_ephemeral_port_is_unknown() {
        let launcher = CommandLauncher::new("sh").args(["-c", "exec sleep 30", "skiff-node"]);
        let broker = builder().enable_plaintext().build(&launcher).unwrap();
        assert!(broker.plaintext_addr().is_none());
    }

    #[test]
    fn test_command_launcher_missing_program() {
        let launcher = CommandLauncher::new("/nonexistent/skiff-broker");
        let mut builder = builder();
        builder.enable_plaintext();
        let err = builder.build(&launcher).unwrap_err();

        assert!(matches!(err, HarnessError::Launch { source: Some(_), .. }));
        let properties = builder
            .resolved_log_dir()
            .unwrap()
            .with_extension("properties");
        assert!(!properties.exists());
        std::fs::remove_dir_all(builder.resolved_log_dir().unwrap()).unwrap();
    }
}
