//! Community credential.

use crate::version::Version;
use bytes::Bytes;

/// SNMPv1/v2c community credential: a shared secret plus protocol version.
///
/// Compared by value, cheap to clone, immutable once constructed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Community {
    secret: Bytes,
    version: Version,
}

impl Community {
    /// Create a community credential.
    pub fn new(secret: impl Into<Bytes>, version: Version) -> Self {
        Self {
            secret: secret.into(),
            version,
        }
    }

    /// The community secret.
    pub fn secret(&self) -> &Bytes {
        &self.secret
    }

    /// The protocol version.
    pub fn version(&self) -> Version {
        self.version
    }
}

impl std::fmt::Debug for Community {
    // The secret is a credential; keep it out of logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Community")
            .field("secret", &"<redacted>")
            .field("version", &self.version)
            .finish()
    }
}
