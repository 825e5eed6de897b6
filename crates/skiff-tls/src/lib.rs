//! # Skiff TLS
//!
//! Ephemeral TLS material for embedded test brokers.
//!
//! The broker configuration builder only needs the [`SecurityMaterialGenerator`]
//! contract; [`PemMaterialGenerator`] is the default implementation, minting
//! self-signed certificates with `rcgen` and writing PEM key/trust stores.
//!
//! ## Example
//!
//! ```no_run
//! use skiff_tls::{MaterialRequest, PemMaterialGenerator, SecurityMaterialGenerator};
//!
//! # fn main() -> Result<(), skiff_tls::TlsError> {
//! let request = MaterialRequest::server("server1")
//!     .with_trust_store(Some("/tmp/shared/truststore.pem".into()));
//! let ssl = PemMaterialGenerator::new().generate(&request)?;
//! assert_eq!(ssl["ssl.keystore.type"], "PEM");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod material;
mod pem;

pub use error::TlsError;
pub use material::{keys, ConnectionMode, MaterialRequest, SecurityMaterialGenerator, SslConfig};
pub use pem::{PemMaterialGenerator, DEFAULT_ENABLED_PROTOCOLS, DEFAULT_TLS_PROTOCOL, PEM_STORE_TYPE};
