//! Security material contract.
//!
//! A [`SecurityMaterialGenerator`] turns a [`MaterialRequest`] into the flat
//! `ssl.*` entries a broker (or client) needs to speak TLS.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::TlsError;

/// Configuration keys produced by a generator.
pub mod keys {
    /// Keystore file format.
    pub const KEYSTORE_TYPE: &str = "ssl.keystore.type";
    /// Keystore file location.
    pub const KEYSTORE_LOCATION: &str = "ssl.keystore.location";
    /// Truststore file format.
    pub const TRUSTSTORE_TYPE: &str = "ssl.truststore.type";
    /// Truststore file location.
    pub const TRUSTSTORE_LOCATION: &str = "ssl.truststore.location";
    /// TLS protocol used to build the SSL context.
    pub const PROTOCOL: &str = "ssl.protocol";
    /// Comma-separated list of enabled TLS versions.
    pub const ENABLED_PROTOCOLS: &str = "ssl.enabled.protocols";
    /// Whether the server requests client certificates.
    pub const CLIENT_AUTH: &str = "ssl.client.auth";
}

/// Flat `ssl.*` key/value entries.
pub type SslConfig = BTreeMap<String, String>;

/// Which side of a connection the material is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionMode {
    /// A connecting client.
    Client,
    /// A listening server.
    Server,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => f.write_str("client"),
            Self::Server => f.write_str("server"),
        }
    }
}

/// Parameters for a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRequest {
    /// Whether the peer must present a certificate.
    pub client_auth_required: bool,
    /// Whether trust store entries are emitted alongside the keystore.
    pub server_mode: bool,
    /// Connection role.
    pub mode: ConnectionMode,
    /// Shared trust store. A fresh one is created when absent.
    pub trust_store: Option<PathBuf>,
    /// Certificate alias; must be unique per trust store.
    pub alias: String,
}

impl MaterialRequest {
    /// Request for a broker listener with the given alias.
    ///
    /// Client auth is off and trust store entries are included.
    pub fn server(alias: impl Into<String>) -> Self {
        Self {
            client_auth_required: false,
            server_mode: true,
            mode: ConnectionMode::Server,
            trust_store: None,
            alias: alias.into(),
        }
    }

    /// Request for a client connecting to brokers that share `trust_store`.
    pub fn client(alias: impl Into<String>, trust_store: impl Into<PathBuf>) -> Self {
        Self {
            client_auth_required: false,
            server_mode: false,
            mode: ConnectionMode::Client,
            trust_store: Some(trust_store.into()),
            alias: alias.into(),
        }
    }

    /// Set the trust store.
    #[must_use]
    pub fn with_trust_store(mut self, trust_store: Option<PathBuf>) -> Self {
        self.trust_store = trust_store;
        self
    }

    /// Require client certificates.
    #[must_use]
    pub fn with_client_auth(mut self, required: bool) -> Self {
        self.client_auth_required = required;
        self
    }

    pub(crate) fn needs_keystore(&self) -> bool {
        self.mode == ConnectionMode::Server || self.client_auth_required
    }

    pub(crate) fn needs_truststore(&self) -> bool {
        self.server_mode || self.mode == ConnectionMode::Client
    }
}

/// Produces TLS material for a connection endpoint.
pub trait SecurityMaterialGenerator: Send + Sync {
    /// Generate the material and return its configuration entries.
    ///
    /// # Errors
    ///
    /// Returns [`TlsError`] on key generation or store I/O failure.
    fn generate(&self, request: &MaterialRequest) -> Result<SslConfig, TlsError>;
}

impl<G: SecurityMaterialGenerator + ?Sized> SecurityMaterialGenerator for std::sync::Arc<G> {
    fn generate(&self, request: &MaterialRequest) -> Result<SslConfig, TlsError> {
        (**self).generate(request)
    }
}
