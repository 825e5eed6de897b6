//! PEM-file backed security material.
//!
//! Every call mints a fresh self-signed certificate for the requested alias,
//! writes `<alias>.keystore.pem` next to the trust store and appends the
//! certificate to the trust store bundle. Brokers built against the same
//! trust store therefore trust each other, and so does any client pointed at
//! that bundle.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use rcgen::{Certificate, CertificateParams, DistinguishedName, DnType, KeyPair};

use crate::material::{keys, ConnectionMode, MaterialRequest, SecurityMaterialGenerator, SslConfig};
use crate::TlsError;

/// Store format understood by the broker's SSL engine.
pub const PEM_STORE_TYPE: &str = "PEM";

/// TLS version used to build the SSL context.
pub const DEFAULT_TLS_PROTOCOL: &str = "TLSv1.3";

/// TLS versions enabled on listeners.
pub const DEFAULT_ENABLED_PROTOCOLS: &str = "TLSv1.2,TLSv1.3";

const TRUSTSTORE_FILE: &str = "truststore.pem";

/// Generates self-signed PEM key and trust stores with `rcgen`.
#[derive(Debug, Clone)]
pub struct PemMaterialGenerator {
    subject_alt_names: Vec<String>,
}

impl Default for PemMaterialGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PemMaterialGenerator {
    /// Generator whose certificates are valid for `localhost` and `127.0.0.1`.
    pub fn new() -> Self {
        Self {
            subject_alt_names: vec!["localhost".to_string(), "127.0.0.1".to_string()],
        }
    }

    /// Add a subject alternative name to generated certificates.
    #[must_use]
    pub fn with_subject_alt_name(mut self, name: impl Into<String>) -> Self {
        self.subject_alt_names.push(name.into());
        self
    }

    fn self_signed(&self, alias: &str) -> Result<(Certificate, KeyPair), TlsError> {
        let key = KeyPair::generate()?;
        let mut params = CertificateParams::new(self.subject_alt_names.clone())?;
        let mut name = DistinguishedName::new();
        name.push(DnType::CommonName, alias);
        params.distinguished_name = name;
        let cert = params.self_signed(&key)?;
        Ok((cert, key))
    }
}

impl SecurityMaterialGenerator for PemMaterialGenerator {
    fn generate(&self, request: &MaterialRequest) -> Result<SslConfig, TlsError> {
        let trust_store = match &request.trust_store {
            Some(path) => path.clone(),
            None => fresh_trust_store()?,
        };

        let mut config = SslConfig::new();
        config.insert(keys::PROTOCOL.to_string(), DEFAULT_TLS_PROTOCOL.to_string());
        config.insert(
            keys::ENABLED_PROTOCOLS.to_string(),
            DEFAULT_ENABLED_PROTOCOLS.to_string(),
        );

        if request.needs_keystore() {
            let (cert, key) = self.self_signed(&request.alias)?;
            let (cert_pem, key_pem) = (cert.pem(), key.serialize_pem());
            let keystore = store_dir(&trust_store).join(format!("{}.keystore.pem", request.alias));

            // Key first, then the chain.
            let mut contents = String::with_capacity(key_pem.len() + cert_pem.len());
            contents.push_str(&key_pem);
            contents.push_str(&cert_pem);
            fs::write(&keystore, contents).map_err(|e| TlsError::io(&keystore, e))?;
            append_certificate(&trust_store, &cert_pem)?;

            config.insert(keys::KEYSTORE_TYPE.to_string(), PEM_STORE_TYPE.to_string());
            config.insert(
                keys::KEYSTORE_LOCATION.to_string(),
                keystore.display().to_string(),
            );
        }

        if request.needs_truststore() {
            ensure_exists(&trust_store)?;
            config.insert(keys::TRUSTSTORE_TYPE.to_string(), PEM_STORE_TYPE.to_string());
            config.insert(
                keys::TRUSTSTORE_LOCATION.to_string(),
                trust_store.display().to_string(),
            );
        }

        if request.mode == ConnectionMode::Server {
            let client_auth = if request.client_auth_required {
                "required"
            } else {
                "none"
            };
            config.insert(keys::CLIENT_AUTH.to_string(), client_auth.to_string());
        }

        tracing::debug!(
            alias = %request.alias,
            mode = %request.mode,
            trust_store = %trust_store.display(),
            "generated security material"
        );

        Ok(config)
    }
}

fn fresh_trust_store() -> Result<PathBuf, TlsError> {
    let dir = tempfile::Builder::new()
        .prefix("skiff-tls")
        .tempdir()
        .map_err(|e| TlsError::io(std::env::temp_dir(), e))?;
    #[allow(deprecated)]
    let dir = dir.into_path();
    Ok(dir.join(TRUSTSTORE_FILE))
}

fn store_dir(trust_store: &Path) -> PathBuf {
    trust_store
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn append_certificate(trust_store: &Path, cert_pem: &str) -> Result<(), TlsError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(trust_store)
        .map_err(|e| TlsError::io(trust_store, e))?;
    file.write_all(cert_pem.as_bytes())
        .map_err(|e| TlsError::io(trust_store, e))
}

fn ensure_exists(trust_store: &Path) -> Result<(), TlsError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(trust_store)
        .map(drop)
        .map_err(|e| TlsError::io(trust_store, e))
}
