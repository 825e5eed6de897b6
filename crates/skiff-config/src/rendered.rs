//! Finalized broker configuration.
//!
//! [`RenderedConfig`] is the only thing handed to the broker: a flat, sorted
//! map of configuration keys to their string values.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{keys, SecurityProtocol};

/// Host used for every rendered listener.
pub const LISTENER_HOST: &str = "localhost";

/// Separator between listener entries.
pub const LISTENER_SEPARATOR: &str = ",";

/// A single `PROTOCOL://host:port` listener entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Listener {
    /// Listener protocol.
    pub protocol: SecurityProtocol,
    /// Bind host.
    pub host: String,
    /// Bind port; 0 lets the OS choose.
    pub port: i32,
}

impl Listener {
    /// Listener on [`LISTENER_HOST`].
    pub fn localhost(protocol: SecurityProtocol, port: i32) -> Self {
        Self {
            protocol,
            host: LISTENER_HOST.to_string(),
            port,
        }
    }

    /// Parse a `PROTOCOL://host:port` entry.
    pub fn parse(entry: &str) -> Option<Self> {
        let (protocol, address) = entry.trim().split_once("://")?;
        let (host, port) = address.rsplit_once(':')?;
        Some(Self {
            protocol: protocol.parse().ok()?,
            host: host.to_string(),
            port: port.parse().ok()?,
        })
    }
}

impl fmt::Display for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}

/// Immutable key/value configuration for one broker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedConfig {
    entries: BTreeMap<String, String>,
}

impl RenderedConfig {
    pub(crate) fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.entries
    }

    /// Parsed `broker.id`.
    pub fn node_id(&self) -> Option<i32> {
        self.get(keys::BROKER_ID)?.parse().ok()
    }

    /// Parsed `listeners`, in rendered order. Malformed entries are skipped.
    pub fn listeners(&self) -> Vec<Listener> {
        self.get(keys::LISTENERS)
            .map(|raw| {
                raw.split(LISTENER_SEPARATOR)
                    .filter_map(Listener::parse)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Listener for `protocol`, if rendered.
    pub fn listener(&self, protocol: SecurityProtocol) -> Option<Listener> {
        self.listeners().into_iter().find(|l| l.protocol == protocol)
    }

    /// The broker's log directory.
    pub fn log_dir(&self) -> Option<&Path> {
        self.get(keys::LOG_DIR).map(Path::new)
    }

    /// Render as a `.properties` document, one `key=value` line per entry.
    pub fn to_properties(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(value, false));
            out.push('\n');
        }
        out
    }

    /// Write [`to_properties`](Self::to_properties) to `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be written.
    pub fn write_properties(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.to_properties())
    }
}

impl<'a> IntoIterator for &'a RenderedConfig {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<RenderedConfig> for BTreeMap<String, String> {
    fn from(config: RenderedConfig) -> Self {
        config.entries
    }
}

// Java properties escaping: spaces are escaped everywhere in keys but only
// in leading position in values. The broker decodes the file as ISO-8859-1,
// so anything outside printable ASCII becomes UTF-16 `\uXXXX` escapes.
fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04X}");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> RenderedConfig {
        RenderedConfig::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_listener_display_and_parse() {
        let listener = Listener::localhost(SecurityProtocol::Ssl, 9093);
        assert_eq!(listener.to_string(), "SSL://localhost:9093");
        assert_eq!(Listener::parse("SSL://localhost:9093"), Some(listener));
    }

    #[test]
    fn test_listener_parse_rejects_garbage() {
        assert!(Listener::parse("localhost:9092").is_none());
        assert!(Listener::parse("FOO://localhost:9092").is_none());
        assert!(Listener::parse("PLAINTEXT://localhost:port").is_none());
    }

    #[test]
    fn test_typed_accessors() {
        let config = config(&[
            (keys::BROKER_ID, "42"),
            (
                keys::LISTENERS,
                "PLAINTEXT://localhost:0,SSL://localhost:9093",
            ),
            (keys::LOG_DIR, "/tmp/skiff-log-1"),
        ]);

        assert_eq!(config.node_id(), Some(42));
        assert_eq!(config.log_dir(), Some(Path::new("/tmp/skiff-log-1")));

        let listeners = config.listeners();
        assert_eq!(listeners.len(), 2);
        assert_eq!(listeners[0].protocol, SecurityProtocol::Plaintext);
        assert_eq!(listeners[1].port, 9093);
        assert_eq!(
            config.listener(SecurityProtocol::Ssl).map(|l| l.port),
            Some(9093)
        );
        assert!(config.listener(SecurityProtocol::SaslSsl).is_none());
    }

    #[test]
    fn test_empty_listener_list() {
        let config = config(&[(keys::LISTENERS, "")]);
        assert!(config.listeners().is_empty());
        assert!(RenderedConfig::default().listeners().is_empty());
    }

    #[test]
    fn test_to_properties_sorted_and_escaped() {
        let config = config(&[
            ("zookeeper.connect", "localhost:2181"),
            ("broker.id", "1"),
            ("ssl.endpoint.identification.algorithm", ""),
            ("path", "C:\\data dir"),
        ]);

        assert_eq!(
            config.to_properties(),
            "broker.id=1\n\
             path=C\\:\\\\data dir\n\
             ssl.endpoint.identification.algorithm=\n\
             zookeeper.connect=localhost\\:2181\n"
        );
    }

    #[test]
    fn test_to_properties_escapes_non_ascii() {
        let config = config(&[
            ("broker.rack", "rack-\u{e9}"),
            ("log.dir", "/tmp/\u{1F600}"),
            ("note", "a\u{7}b"),
        ]);

        let out = config.to_properties();
        assert!(out.is_ascii());
        assert_eq!(
            out,
            "broker.rack=rack-\\u00E9\n\
             log.dir=/tmp/\\uD83D\\uDE00\n\
             note=a\\u0007b\n"
        );
    }

    #[test]
    fn test_write_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.properties");
        let config = config(&[("broker.id", "3")]);

        config.write_properties(&path).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "broker.id=3\n");
    }

    #[test]
    fn test_serde_is_flat_map() {
        let config = config(&[("broker.id", "3"), ("log.dir", "/tmp/x")]);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"broker.id":"3","log.dir":"/tmp/x"}"#);

        let back: RenderedConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
