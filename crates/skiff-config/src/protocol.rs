//! Listener security protocols.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::BrokerConfigError;

/// Security protocols known to the broker.
///
/// The builder can only enable [`Plaintext`](Self::Plaintext) and
/// [`Ssl`](Self::Ssl) listeners; the SASL variants exist so that listener
/// strings produced elsewhere still parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityProtocol {
    /// Unencrypted, unauthenticated.
    Plaintext,
    /// TLS encrypted.
    Ssl,
    /// SASL authenticated, unencrypted.
    SaslPlaintext,
    /// SASL authenticated, TLS encrypted.
    SaslSsl,
}

impl SecurityProtocol {
    /// All protocols, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Plaintext,
        Self::Ssl,
        Self::SaslPlaintext,
        Self::SaslSsl,
    ];

    /// Wire name used in listener strings and protocol settings.
    pub fn name(self) -> &'static str {
        match self {
            Self::Plaintext => "PLAINTEXT",
            Self::Ssl => "SSL",
            Self::SaslPlaintext => "SASL_PLAINTEXT",
            Self::SaslSsl => "SASL_SSL",
        }
    }
}

impl fmt::Display for SecurityProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SecurityProtocol {
    type Err = BrokerConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| BrokerConfigError::invalid_argument(format!("unknown protocol: {s}")))
    }
}
